//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - All REST endpoints return correct responses
//! - Authentication middleware functions properly
//! - Workload errors map onto status codes

use std::net::SocketAddr;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use workload_bench::{
    Workload,
    api::{ApiConfig, ApiState, spawn_api_server},
    config::Config,
};

use crate::helpers::*;

async fn spawn_test_api(workload: Workload) -> SocketAddr {
    let config = Config {
        address_template: "https://{id}.{environment}.example".to_string(),
        environment: "test".to_string(),
        ..Config::default()
    };
    let api_config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        enable_cors: true,
    };

    spawn_api_server(api_config, ApiState::new(workload, config))
        .await
        .unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn send(request: reqwest::RequestBuilder) -> (StatusCode, Value) {
    let response = request
        .basic_auth("neo4j", Some("secret"))
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_index_and_health_need_no_auth() {
    let factory = ScriptedFactory::new();
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    let index = client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(index.status().as_u16(), 200);
    assert!(index.text().await.unwrap().contains("/wait/<N>"));

    let health: Value = client()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["running"], false);
}

#[tokio::test]
async fn test_auth_required() {
    let factory = ScriptedFactory::new();
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    let missing = client()
        .get(format!("http://{addr}/targets"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let bearer = client()
        .get(format!("http://{addr}/targets"))
        .bearer_auth("token")
        .send()
        .await
        .unwrap();
    assert_eq!(bearer.status().as_u16(), 401);
}

#[tokio::test]
async fn test_target_crud() {
    let factory = ScriptedFactory::new();
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    let (status, body) = send(client().post(format!("http://{addr}/targets/xyz"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "header": ["name", "address", "running", "read", "write"],
            "rows": [["xyz", "https://xyz.test.example", false, 0, 0]],
        })
    );

    send(client().post(format!("http://{addr}/targets/abc"))).await;

    let (status, body) = send(client().get(format!("http://{addr}/targets"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0][0], "abc");
    assert_eq!(body["rows"][1][0], "xyz");

    let (status, body) = send(client().get(format!("http://{addr}/targets/abc"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0][1], "https://abc.test.example");

    let (status, _) = send(client().delete(format!("http://{addr}/targets/abc"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(client().get(format!("http://{addr}/targets/abc"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to show workload for database");
}

#[tokio::test]
async fn test_unreachable_target_is_bad_gateway() {
    let factory = ScriptedFactory::new();
    factory.set(
        "abc",
        Behavior {
            unreachable: true,
            ..Behavior::default()
        },
    );
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    let (status, body) = send(client().post(format!("http://{addr}/targets/abc"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to add workload for database");
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let factory = ScriptedFactory::new();
    let workload = workload_with(&factory, 5, &["abc"]).await;
    let addr = spawn_test_api(workload.clone()).await;

    let (status, body) = send(client().post(format!("http://{addr}/start"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": "Started" }));

    let (status, _) = send(client().post(format!("http://{addr}/start"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(client().get(format!("http://{addr}/wait/3"))).await;
    assert_eq!(status, StatusCode::OK);
    let reached: usize = body["result"].as_str().unwrap().parse().unwrap();
    assert!(reached >= 3);

    let (status, body) = send(client().post(format!("http://{addr}/stop"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": "Stopped" }));

    let (status, _) = send(client().post(format!("http://{addr}/stop"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    workload.shutdown().await;

    let (status, body) = send(client().get(format!("http://{addr}/stats"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["header"], json!(["target", "operation", "count"]));
    assert_eq!(body["rows"][0][0], "abc");
    assert_eq!(body["rows"][0][1], "read");

    let (status, body) = send(client().get(format!("http://{addr}/stats/abc"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["header"], json!(["timestamp", "duration"]));
    assert_eq!(body["rows"].as_array().unwrap().len() as i64, series_len(&workload, "read").await);

    let (status, body) = send(client().get(format!("http://{addr}/stats/table"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["header"], json!(["timestamp", "read:abc", "write:abc"]));
}

async fn series_len(workload: &Workload, operation: &str) -> i64 {
    workload.counts_for("abc", operation).await.unwrap() as i64
}

#[tokio::test]
async fn test_bad_requests() {
    let factory = ScriptedFactory::new();
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    let (status, body) = send(client().get(format!("http://{addr}/wait/many"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse threshold as integer")
    );

    let (status, body) = send(client().get(format!("http://{addr}/stats/abc/delete"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid result operation: delete");

    let (status, _) = send(client().delete(format!("http://{addr}/targets/nope"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wait_timeout() {
    let factory = ScriptedFactory::new();
    let addr = spawn_test_api(create_workload(&factory, 5)).await;

    // Nothing is running, so the threshold is never reached
    let (status, body) =
        send(client().get(format!("http://{addr}/wait/5?timeout_secs=1"))).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"], "wait cancelled after reaching 0 results");
}

#[tokio::test]
async fn test_table_with_empty_column_is_unprocessable() {
    let factory = ScriptedFactory::new();
    factory.set(
        "abc",
        Behavior {
            model_rows: 0,
            ..Behavior::default()
        },
    );
    let workload = workload_with(&factory, 5, &["abc", "xyz"]).await;
    let addr = spawn_test_api(workload.clone()).await;

    workload.start().await.unwrap();
    workload.wait_for_at_least(2).await.unwrap();
    workload.shutdown().await;

    let (status, body) = send(client().get(format!("http://{addr}/stats/table"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Failed to get results");
    assert_eq!(body["error"], "column 'read:abc' has no samples");
}

#[tokio::test]
async fn test_list_and_counts_filters() {
    let factory = ScriptedFactory::new();
    let workload = workload_with(&factory, 5, &["xyz", "abc"]).await;
    let addr = spawn_test_api(workload).await;

    let (status, body) =
        send(client().get(format!("http://{addr}/targets?columns=name,running"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "header": ["name", "running"],
            "rows": [["abc", false], ["xyz", false]],
        })
    );

    let (status, body) = send(client().get(format!("http://{addr}/stats?target=xyz"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "header": ["target", "operation", "count"],
            "rows": [["xyz", "read", 0], ["xyz", "write", 0]],
        })
    );

    let (_, body) = send(client().get(format!("http://{addr}/stats"))).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);
}
