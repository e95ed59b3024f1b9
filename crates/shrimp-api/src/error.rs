use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use shrimp_db::models::BalanceOverflow;
use shrimp_types::input::InputError;

/// Request failures that change the HTTP status. Business-rule rejections
/// (not enough points, cooldowns, ...) are not errors: handlers return them
/// as ordinary 200 text so chat bots can print them verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl ApiError {
    /// Storage errors are internal unless they carry a rejected credit.
    pub fn from_storage(e: anyhow::Error) -> Self {
        match e.downcast_ref::<BalanceOverflow>() {
            Some(overflow) => ApiError::BadRequest(overflow.to_string()),
            None => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg).into_response(),
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
