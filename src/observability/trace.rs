//! Per-request trace identifiers.
//!
//! Every inbound request gets exactly one [`TraceId`], either inherited from
//! the `x-trace-id` header or generated locally. It travels inside a
//! [`RequestContext`] that is stored in the request extensions and passed
//! explicitly to anything that logs on behalf of the request.

use std::fmt;

use rand::Rng;

/// Header carrying a caller-supplied trace identifier, inbound and outbound.
pub const TRACE_HEADER: &str = "x-trace-id";

/// Length of locally generated trace identifiers.
pub const TRACE_ID_LEN: usize = 16;

const TRACE_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque request trace identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a random lowercase alphanumeric identifier.
    ///
    /// No uniqueness check is performed; 36^16 possibilities is plenty for a
    /// single process.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..TRACE_ID_LEN)
            .map(|_| TRACE_CHARSET[rng.gen_range(0..TRACE_CHARSET.len())] as char)
            .collect();
        Self(id)
    }

    /// Adopt an inbound header value. Empty values are rejected.
    pub fn from_header(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reuse the inbound trace header when present, otherwise generate one.
pub fn ensure_trace(inbound: Option<&str>) -> TraceId {
    inbound
        .and_then(TraceId::from_header)
        .unwrap_or_else(TraceId::generate)
}

/// Request-scoped context threaded through every call that can log.
///
/// Background work (startup, shutdown) uses [`RequestContext::background`],
/// which carries no trace id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    trace_id: Option<TraceId>,
}

impl RequestContext {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_trace(trace_id: TraceId) -> Self {
        Self {
            trace_id: Some(trace_id),
        }
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Trace id as a log field value; `None` omits the field.
    pub fn trace_id_str(&self) -> Option<&str> {
        self.trace_id.as_ref().map(TraceId::as_str)
    }
}
