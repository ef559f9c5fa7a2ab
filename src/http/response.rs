//! JSON response envelope.
//!
//! # Responsibilities
//! - Wrap handler output as `{code, message, data, details, traceId}`
//! - Map business error codes to HTTP status codes
//!
//! # Design Decisions
//! - The trace id comes from the request's `RequestContext`, so clients can
//!   quote it when reporting a problem
//! - Errors carry an empty object as `data`, never `null`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ErrorCode;
use crate::observability::RequestContext;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    pub code: u32,
    pub message: String,
    pub data: T,
    pub details: Vec<String>,
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(ctx: &RequestContext, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            code: ErrorCode::SUCCESS.code(),
            message: ErrorCode::SUCCESS.message().to_string(),
            data,
            details: Vec::new(),
            trace_id: trace_of(ctx),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiResponse<Value> {
    pub fn error(ctx: &RequestContext, err: &ErrorCode) -> Self {
        Self {
            status: err.status_code(),
            code: err.code(),
            message: err.message().to_string(),
            data: Value::Object(Map::new()),
            details: err.details().to_vec(),
            trace_id: trace_of(ctx),
        }
    }
}

fn trace_of(ctx: &RequestContext) -> String {
    ctx.trace_id_str().unwrap_or_default().to_string()
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::TraceId;

    #[test]
    fn test_success_envelope() {
        let ctx = RequestContext::with_trace(TraceId::from_header("abc").unwrap());
        let body = serde_json::to_value(ApiResponse::success(&ctx, "pong")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "code": 0,
                "message": "Success",
                "data": "pong",
                "details": [],
                "traceId": "abc"
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let ctx = RequestContext::background();
        let err = ErrorCode::INVALID_PARAM.with_details(["id must be positive"]);
        let response = ApiResponse::error(&ctx, &err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["code"], 10003);
        assert_eq!(body["data"], serde_json::json!({}));
        assert_eq!(body["details"][0], "id must be positive");
        assert_eq!(body["traceId"], "");
    }
}
