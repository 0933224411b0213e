//! HTTP request handlers.

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::Response,
};
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::fs;
use tracing::{debug, error};

use crate::middleware::RequestContext;
use crate::resolve::{PathRejection, locate, sanitize};
use crate::state::AppState;

/// Serves the configured index document for `GET /`
///
/// The index path is validated once at startup, so no sanitising happens
/// here; a missing index answers `404 Not Found`.
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    serve_file(&state.index_path()).await
}

/// Serves every other `GET` path from the document root
///
/// Implements several key behaviors:
/// - Percent-decodes and sanitises the URI path before it touches the disk
/// - Answers `404` for `..` segments and `400` for malformed segments
/// - Serves the index document for directory requests, never a listing
/// - Refuses files whose canonical path leaves the root (symlink escapes)
/// - Detects the MIME type from the file extension
pub async fn serve_static(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    uri: Uri,
) -> Result<Response, StatusCode> {
    let relative = sanitize(uri.path()).map_err(|rejection| {
        debug!(id = %ctx.id, "rejected path: {}", rejection);
        match rejection {
            PathRejection::Traversal => StatusCode::NOT_FOUND,
            PathRejection::BadEncoding(_) | PathRejection::BadSegment(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    })?;

    let file_path = locate(state.root(), &relative, &state.index_document)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    serve_file(&file_path).await
}

/// Reads `path` whole and wraps it with a content type guessed from the
/// extension.
async fn serve_file(path: &Path) -> Result<Response, StatusCode> {
    let content = fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::IsADirectory => StatusCode::NOT_FOUND,
        _ => {
            error!("failed to read {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;

    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    let mut response = Response::new(Body::from(content));
    if let Ok(value) = HeaderValue::from_str(mime_type.as_ref()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    Ok(response)
}
