//! 统一的 API 错误类型与转换。

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::tree::TreeError;

/// 只有 BadRequest 与 Unauthorized 携带面向客户端的具体响应，
/// 其余一律压平为不带内部细节的 500。
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(HeaderMap),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unauthorized(headers) => {
                (StatusCode::UNAUTHORIZED, headers, "Unauthorized").into_response()
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<TreeError> for ApiError {
    fn from(error: TreeError) -> Self {
        match error {
            TreeError::Outside => ApiError::BadRequest("Bad request".into()),
            TreeError::CycleDetected(path) => {
                ApiError::Internal(format!("directory cycle at {}", path.display()))
            }
            TreeError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}
