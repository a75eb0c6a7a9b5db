//! 请求路由：路径解析、目录渲染与文件流式响应。

use axum::body::Body as AxumBody;
use axum::extract::{Extension, Query};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::render;
use crate::stream;
use crate::tree::{Entry, Tree};

#[derive(Deserialize)]
pub(crate) struct ViewQuery {
    mode: Option<String>,
}

/// 兜底处理器：任意路径解析为目录视图、文件字节流或错误。
pub async fn serve_entry(
    uri: Uri,
    Query(query): Query<ViewQuery>,
    Extension(tree): Extension<Arc<Tree>>,
) -> Result<Response, ApiError> {
    let decoded = urlencoding::decode(uri.path())
        .map_err(|_| ApiError::BadRequest("Bad request".into()))?;

    match tree.lookup(&decoded).await? {
        Some(Entry::Directory(path)) => {
            let html = match query.mode.as_deref() {
                Some("viewer") => render::viewer_page(&tree, &path).await?,
                _ => render::gallery_page(&tree, &path).await?,
            };
            debug!(path = %decoded, mode = query.mode.as_deref().unwrap_or(""), "render directory");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response())
        }
        Some(Entry::File(path)) => serve_file(&path).await,
        None => Err(ApiError::BadRequest("Bad request".into())),
    }
}

/// 以固定块大小流式输出文件内容。
async fn serve_file(path: &Path) -> Result<Response, ApiError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let mime = stream::mimetype(path);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("invalid mime type".into()))?,
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&metadata.len().to_string())
            .map_err(|_| ApiError::Internal("header build failed".into()))?,
    );

    // 分类与打开之间的竞态窗口按设计接受：打开失败走 500。
    let chunks = stream::open_chunks(path)
        .await
        .map_err(|err| ApiError::Internal(format!("open failed: {err}")))?;
    info!(path = %path.display(), size = metadata.len(), "stream file");
    Ok((StatusCode::OK, headers, AxumBody::from_stream(chunks)).into_response())
}
