//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use nanoid::nanoid;
use std::time::Instant;
use tracing::info;

/// Per-request id and start time, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub id: String,
    pub started: Instant,
}

impl RequestContext {
    pub fn start() -> Self {
        Self {
            id: nanoid!(5),
            started: Instant::now(),
        }
    }
}

/// Middleware that logs every request and tags it with a short id
///
/// This middleware:
/// 1. Generates a 5-character nanoid and records the start time
/// 2. Logs the arrival as `→ METHOD path` with the id as a field
/// 3. Stores a [`RequestContext`] in the request extensions for handlers
/// 4. Logs the completion as `← METHOD` with `status` and `latency_ms`
///    fields, including responses produced by the router itself (405s)
///
/// Fields are left uncoloured; [`crate::colors::RequestFields`] styles them
/// when the subscriber writes to a terminal.
pub async fn log_requests(mut req: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::start();
    let method = req.method().clone();

    info!(id = %ctx.id, "→ {} {}", method, req.uri().path());
    req.extensions_mut().insert(ctx.clone());

    let response = next.run(req).await;
    let latency_ms = u64::try_from(ctx.started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        id = %ctx.id,
        status = response.status().as_u16(),
        latency_ms,
        "← {}",
        method
    );
    response
}
