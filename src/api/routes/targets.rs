//! Target registry endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
    },
    client::Credentials,
    registry::Target,
    result::ResultSet,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Comma separated columns to keep, e.g. `name,running`
    columns: Option<String>,
}

impl ListQuery {
    fn columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|columns| columns.split(','))
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .map(String::from)
            .collect()
    }
}

/// GET /targets
///
/// List all targets sorted by id, with their sample counts
pub async fn list_targets(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Json<ResultSet> {
    let targets = state.workload.list().await;
    let summary = state.workload.targets_summary(&targets).await;
    Json(summary.filter_by_columns(&query.columns()))
}

/// POST /targets/:id
///
/// Register a target; the request's credentials are used for its sessions
pub async fn add_target(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Extension(credentials): Extension<Credentials>,
) -> ApiResult<Json<ResultSet>> {
    let address = state.config.address_for(&id);
    let target = Target::new(id, address, credentials);

    state
        .workload
        .add(target.clone())
        .await
        .map_err(ApiError::failed("Failed to add workload for database"))?;

    Ok(Json(state.workload.targets_summary(&[target]).await))
}

/// DELETE /targets/:id
pub async fn remove_target(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResultSet>> {
    let removed = state
        .workload
        .remove(&id)
        .await
        .map_err(ApiError::failed("Failed to remove workload for database"))?;

    Ok(Json(state.workload.targets_summary(&[removed]).await))
}

/// GET /targets/:id
pub async fn show_target(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResultSet>> {
    let target = state
        .workload
        .find(&id)
        .await
        .map_err(ApiError::failed("Failed to show workload for database"))?;

    Ok(Json(state.workload.targets_summary(&[target]).await))
}
