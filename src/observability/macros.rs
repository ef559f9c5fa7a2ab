//! Leveled emission macros.
//!
//! Each macro takes the caller's [`RequestContext`](crate::observability::RequestContext)
//! first and forwards the rest to the matching `tracing` macro, so structured
//! fields and format arguments work exactly as they do there:
//!
//! ```ignore
//! log_info!(ctx, status = 200u64, "ResponseLog");
//! log_warn!(ctx, "retrying {} after {:?}", url, delay);
//! ```
//!
//! The trace id is attached as the `trace_id` field when the context has one.

#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $($rest:tt)+) => {
        ::tracing::debug!(trace_id = $ctx.trace_id_str(), $($rest)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $($rest:tt)+) => {
        ::tracing::info!(trace_id = $ctx.trace_id_str(), $($rest)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $($rest:tt)+) => {
        ::tracing::warn!(trace_id = $ctx.trace_id_str(), $($rest)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $($rest:tt)+) => {
        ::tracing::error!(trace_id = $ctx.trace_id_str(), $($rest)+)
    };
}

/// Emit a fatal record and terminate the process.
///
/// The sink flushes and exits when it sees the record; the trailing exit
/// covers subscribers that have no sink installed.
#[macro_export]
macro_rules! log_fatal {
    ($ctx:expr, $($rest:tt)+) => {{
        ::tracing::error!(trace_id = $ctx.trace_id_str(), log.fatal = true, $($rest)+);
        ::std::process::exit(1)
    }};
}
