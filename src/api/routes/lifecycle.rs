//! Workload lifecycle endpoints

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::api::{
    error::{ApiError, ApiResult},
    state::ApiState,
    types::CommandResponse,
};

/// POST /start
pub async fn start(State(state): State<ApiState>) -> ApiResult<Json<CommandResponse>> {
    state
        .workload
        .start()
        .await
        .map_err(ApiError::failed("Failed to start workload"))?;

    Ok(Json(CommandResponse::new("Started")))
}

/// POST /stop
///
/// Returns as soon as the stop signals are sent
pub async fn stop(State(state): State<ApiState>) -> ApiResult<Json<CommandResponse>> {
    state
        .workload
        .stop()
        .await
        .map_err(ApiError::failed("Failed to stop workload"))?;

    Ok(Json(CommandResponse::new("Stopped")))
}

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    /// Give up after this many seconds (default: wait forever)
    timeout_secs: Option<u64>,
}

/// GET /wait/:threshold
///
/// Block until some series holds at least `threshold` samples and return the
/// largest series length reached
pub async fn wait(
    State(state): State<ApiState>,
    Path(threshold): Path<String>,
    Query(query): Query<WaitQuery>,
) -> ApiResult<Json<CommandResponse>> {
    let threshold: usize = threshold.parse().map_err(|_| {
        ApiError::InvalidRequest(format!(
            "Failed to parse threshold as integer: {threshold}"
        ))
    })?;

    let cancel = CancellationToken::new();
    let _cancel_on_return = cancel.clone().drop_guard();

    if let Some(secs) = query.timeout_secs {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => cancel.cancel(),
                _ = cancel.cancelled() => {}
            }
        });
    }

    let reached = state
        .workload
        .wait_for_at_least_or_cancel(threshold, &cancel)
        .await
        .map_err(ApiError::failed(
            "Failed to wait for specified number of results",
        ))?;

    Ok(Json(CommandResponse::new(reached)))
}
