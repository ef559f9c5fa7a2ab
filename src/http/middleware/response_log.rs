//! Response phase of the capture middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::middleware::{CaptureBody, CaptureState};
use crate::log_info;
use crate::observability::RequestContext;

/// Log the final status and sanitized body once the response has streamed.
pub async fn response_log(
    State(state): State<Arc<CaptureState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if state.should_skip(&path) {
        return next.run(request).await;
    }

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let redactor = state.redactor().clone();

    let (parts, body) = response.into_parts();
    let body = CaptureBody::new(body, move |captured: &[u8]| {
        let cost = start.elapsed();
        let response_body = redactor.body(String::from_utf8_lossy(captured).into_owned());
        log_info!(
            ctx,
            status = status.as_u16(),
            path = %path,
            response = %response_body,
            cost = ?cost,
            cost_ms = cost.as_secs_f64() * 1000.0,
            "ResponseLog"
        );
    });

    Response::from_parts(parts, Body::new(body))
}
