//! Data-access logging.
//!
//! The connection pool itself lives with the application; this module is the
//! hook its query layer calls after every statement so SQL shows up in the
//! same log stream, under the same trace id, as the request that issued it.

use std::error::Error;
use std::time::{Duration, Instant};

use crate::config::LogConfig;
use crate::observability::RequestContext;
use crate::{log_error, log_info, log_warn};

/// How a finished query was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    /// Failed; logged at error as `SqlErrorLog`.
    Failed,
    /// Slower than the threshold; logged at warn as `SqlSlowLog`.
    Slow,
    /// Logged at info as `SqlInfoLog`.
    Normal,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryLogger {
    slow_threshold: Duration,
}

impl QueryLogger {
    /// A zero threshold disables slow-query detection.
    pub fn new(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.slow_query_threshold())
    }

    pub fn classify(&self, elapsed: Duration, failed: bool) -> QueryClass {
        if failed {
            QueryClass::Failed
        } else if !self.slow_threshold.is_zero() && elapsed > self.slow_threshold {
            QueryClass::Slow
        } else {
            QueryClass::Normal
        }
    }

    /// Log one finished statement that started at `begin`.
    pub fn trace(
        &self,
        ctx: &RequestContext,
        begin: Instant,
        sql: &str,
        rows: i64,
        error: Option<&(dyn Error + 'static)>,
    ) -> QueryClass {
        let elapsed = begin.elapsed();
        let class = self.classify(elapsed, error.is_some());

        match (class, error) {
            (QueryClass::Failed, Some(error)) => log_error!(
                ctx,
                elapsed = ?elapsed,
                rows,
                sql,
                error = %error,
                "SqlErrorLog"
            ),
            (QueryClass::Slow, _) => log_warn!(ctx, elapsed = ?elapsed, rows, sql, "SqlSlowLog"),
            _ => log_info!(ctx, elapsed = ?elapsed, rows, sql, "SqlInfoLog"),
        }

        class
    }
}
