use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use fxrates_core::DateError;
use fxrates_warehouse::WarehouseError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Handler-level failures mapped onto the HTTP contract.
///
/// Date problems become `400 {"cause": ...}` with the core's message verbatim.
/// Warehouse faults are not handled locally; they surface as a bare 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    BadDate(#[from] DateError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadDate(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "cause": err.to_string() })),
            )
                .into_response(),
            Self::Warehouse(err) => {
                tracing::error!(error = %err, "warehouse query failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
