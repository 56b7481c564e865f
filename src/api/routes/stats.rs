//! Workload result endpoints

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
    },
    result::{ResultSet, Value},
};

const FAILED: &str = "Failed to get results";

#[derive(Debug, Default, Deserialize)]
pub struct CountsQuery {
    /// Only report counts of this target
    target: Option<String>,
}

/// GET /stats
///
/// Sample counts per target and operation
pub async fn get_counts(
    State(state): State<ApiState>,
    Query(query): Query<CountsQuery>,
) -> Json<ResultSet> {
    let filter: HashMap<String, Value> = query
        .target
        .into_iter()
        .map(|target| ("target".to_string(), Value::from(target)))
        .collect();

    Json(state.workload.results().await.filter_by_rows(&filter))
}

/// GET /stats/table
///
/// All series merged into one gap-filled table
pub async fn get_table(State(state): State<ApiState>) -> ApiResult<Json<ResultSet>> {
    let table = state
        .workload
        .results_table()
        .await
        .map_err(ApiError::failed(FAILED))?;

    Ok(Json(table))
}

/// GET /stats/:id
///
/// Read series of one target
pub async fn get_read_series(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResultSet>> {
    series(&state, &id, "read").await
}

/// GET /stats/:id/:operation
pub async fn get_series(
    State(state): State<ApiState>,
    Path((id, operation)): Path<(String, String)>,
) -> ApiResult<Json<ResultSet>> {
    series(&state, &id, &operation).await
}

async fn series(state: &ApiState, id: &str, operation: &str) -> ApiResult<Json<ResultSet>> {
    let result = state
        .workload
        .results_for(id, operation)
        .await
        .map_err(ApiError::failed(FAILED))?;

    Ok(Json(result))
}
