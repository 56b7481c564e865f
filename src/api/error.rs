//! API error types and conversions

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::WorkloadError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// A workload operation failed
    Workload {
        message: &'static str,
        source: WorkloadError,
    },

    /// Invalid request parameters
    InvalidRequest(String),
}

impl ApiError {
    /// Wrap a workload error with what the request was trying to do
    pub fn failed(message: &'static str) -> impl FnOnce(WorkloadError) -> ApiError {
        move |source| ApiError::Workload { message, source }
    }
}

fn status_for(err: &WorkloadError) -> StatusCode {
    match err {
        WorkloadError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkloadError::AlreadyStarted | WorkloadError::AlreadyStopped => StatusCode::CONFLICT,
        WorkloadError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        WorkloadError::Connectivity { .. } => StatusCode::BAD_GATEWAY,
        WorkloadError::DegenerateColumn(_) | WorkloadError::TickRange { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkloadError::Cancelled(_) => StatusCode::REQUEST_TIMEOUT,
        WorkloadError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Workload { message, source } => (
                status_for(&source),
                json!({
                    "message": message,
                    "error": source.to_string(),
                }),
            ),
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<WorkloadError> for ApiError {
    fn from(err: WorkloadError) -> Self {
        ApiError::failed("Request failed")(err)
    }
}
