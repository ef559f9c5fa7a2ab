//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request enters
//!     → trace.rs (TraceId inherited or generated, stored in RequestContext)
//!
//! Any component holding a RequestContext:
//!     → macros.rs (log_info!(ctx, ...) attaches trace_id)
//!     → tracing event
//!     → logging.rs (SinkLayer builds a LogRecord)
//!     → record.rs (single-line JSON)
//!     → rotate.rs (default.log / error.log, size/age/count bounded, gzip)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace id flows explicitly through RequestContext, never through globals
//! - Error records are always duplicated to error.log
//! - The sink is flushed once, at shutdown

pub mod logging;
pub mod macros;
pub mod record;
pub mod rotate;
pub mod trace;

pub use logging::{LogSink, SinkCell, SinkError, SinkLayer};
pub use record::{LogRecord, Severity};
pub use trace::{ensure_trace, RequestContext, TraceId, TRACE_HEADER};
