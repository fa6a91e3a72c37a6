//! Error responses of the daemon API: `{"message": "..."}` or a bare status

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 with an explanation for the client
    #[error("{0}")]
    BadRequest(String),

    /// 400 without a body
    #[error("invalid request")]
    InvalidRequest,

    /// 500 without a body; the detail is only logged
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Status with a JSON message body
pub fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(MessageBody { message: text.into() })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(text) => message(StatusCode::BAD_REQUEST, text),
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST.into_response(),
            ApiError::Internal(detail) => {
                tracing::error!("{}", detail);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
