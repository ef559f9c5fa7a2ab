//! Request/response capture middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → access_log.rs (skip check, trace id, buffered body, AccessLog record)
//!     → response_log.rs (skip check, start timer, wrap response body)
//!     → CatchPanicLayer (a panicking handler becomes a 500)
//!     → handler
//!     → capture.rs (mirror body frames while they stream out)
//!     → ResponseLog record once the body completes
//! ```
//!
//! # Design Decisions
//! - Skip patterns are compiled once into a `RegexSet`
//! - Both phases share one `CaptureState`
//! - The request body is buffered in full and replaced, so handlers can still
//!   read it; the response body is never buffered ahead of the client

pub mod access_log;
pub mod capture;
pub mod response_log;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use regex::RegexSet;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::LogConfig;
use crate::redact::Redactor;

pub use access_log::access_log;
pub use capture::CaptureBody;
pub use response_log::response_log;

/// Shared configuration for both capture phases.
#[derive(Debug, Clone)]
pub struct CaptureState {
    skip: RegexSet,
    redactor: Redactor,
}

impl CaptureState {
    pub fn new<I, S>(skip_paths: I, redactor: Redactor) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            skip: RegexSet::new(skip_paths)?,
            redactor,
        })
    }

    pub fn from_config(config: &LogConfig) -> Result<Self, regex::Error> {
        Self::new(&config.skip_paths, Redactor::from_config(config))
    }

    /// True when any skip pattern matches `path`.
    pub fn should_skip(&self, path: &str) -> bool {
        self.skip.is_match(path)
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }
}

/// Wrap `router` with both capture phases, request phase outermost.
///
/// Handler panics are caught inside the capture layers so the pair of
/// records is still written, with a 500 status.
pub fn layer_capture<S>(router: Router<S>, state: Arc<CaptureState>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::new())
        .layer(from_fn_with_state(state.clone(), response_log))
        .layer(from_fn_with_state(state, access_log))
}
