//! Request phase of the capture middleware.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::http::middleware::CaptureState;
use crate::http::request::client_ip;
use crate::observability::{ensure_trace, RequestContext, TRACE_HEADER};
use crate::redact::{header_fields, redact_headers, AUTH_HEADER};
use crate::{log_info, log_warn};

/// Establish the request's trace id and log the sanitized request.
///
/// The body is read in full and put back, so the handler sees it unchanged.
pub async fn access_log(
    State(state): State<Arc<CaptureState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.should_skip(request.uri().path()) {
        return next.run(request).await;
    }

    let inbound = request
        .headers()
        .get(TRACE_HEADER)
        .and_then(|v| v.to_str().ok());
    let ctx = RequestContext::with_trace(ensure_trace(inbound));

    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(ctx.clone());

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log_warn!(ctx, error = %e, "failed to read request body");
            Bytes::new()
        }
    };

    let request_body = state
        .redactor()
        .body(String::from_utf8_lossy(&bytes).into_owned());

    let mut headers = header_fields(&parts.headers);
    redact_headers(&mut headers, &[AUTH_HEADER]);
    let headers = serde_json::to_string(&headers).unwrap_or_default();

    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    log_info!(
        ctx,
        method = %parts.method,
        ip = %client_ip(&parts.headers, &parts.extensions),
        path = parts.uri.path(),
        json.header = %headers,
        query = parts.uri.query().unwrap_or_default(),
        user_agent = user_agent,
        request = %request_body,
        "AccessLog"
    );

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
