//! Outbound HTTP client that propagates the trace id.

use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::log_debug;
use crate::observability::{RequestContext, TraceId, TRACE_HEADER};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_IDLE_PER_HOST: usize = 100;

/// Shared pooled client. Every request carries `x-trace-id`: the caller's
/// trace id, or a fresh one for background work.
#[derive(Debug, Clone)]
pub struct TracedClient {
    client: reqwest::Client,
}

impl TracedClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one built with `no_proxy()` in tests.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send `request` with the trace header set.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let trace_id = outbound_trace(ctx);
        if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
            request.headers_mut().insert(TRACE_HEADER, value);
        }

        log_debug!(
            ctx,
            method = %request.method(),
            url = %request.url(),
            outbound_trace_id = trace_id.as_str(),
            "outbound request"
        );
        self.client.execute(request).await
    }

    /// `GET url` with the trace header set.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        url: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let request = self.client.get(url).build()?;
        self.execute(ctx, request).await
    }
}

fn outbound_trace(ctx: &RequestContext) -> TraceId {
    ctx.trace_id().cloned().unwrap_or_else(TraceId::generate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_trace_reuses_context() {
        let ctx = RequestContext::with_trace(TraceId::from_header("abc").unwrap());
        assert_eq!(outbound_trace(&ctx).as_str(), "abc");

        let generated = outbound_trace(&RequestContext::background());
        assert_eq!(generated.as_str().len(), crate::observability::trace::TRACE_ID_LEN);
    }
}
