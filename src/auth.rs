//! Basic 认证：单一共享密钥的访问门禁。

use axum::body::Body as AxumBody;
use axum::extract::Extension;
use axum::http::{HeaderMap, HeaderValue, Request, header};
use axum::{middleware, response::Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;

use crate::config::BASIC_CHALLENGE;
use crate::error::ApiError;

/// 认证门禁。期望的请求头值在启动时计算一次；
/// 未配置密钥时门禁关闭，所有请求直接放行。
#[derive(Debug)]
pub struct AuthGate {
    expected: Option<String>,
}

impl AuthGate {
    pub fn from_secret(secret: Option<&str>) -> Self {
        let expected = secret
            .filter(|value| !value.is_empty())
            .map(|value| format!("Basic {}", BASE64.encode(value)));
        Self { expected }
    }

    /// 将请求的 Authorization 头与期望值逐字节比较。
    pub fn verify(&self, header: Option<&str>) -> bool {
        match &self.expected {
            None => true,
            Some(expected) => header == Some(expected.as_str()),
        }
    }
}

/// 认证中间件：校验失败时返回 401 与 Basic 质询头。
pub async fn require_auth(
    Extension(gate): Extension<Arc<AuthGate>>,
    req: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if gate.verify(header) {
        return Ok(next.run(req).await);
    }
    Err(unauthorized())
}

fn unauthorized() -> ApiError {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(BASIC_CHALLENGE),
    );
    ApiError::Unauthorized(headers)
}
