//! top-ping HTTP service library.
//!
//! Everything except the CLI entry point: configuration, the request/response
//! observability pipeline (trace ids, structured rotating logs, redaction,
//! capture middleware), and the small HTTP surface built on top of it.

pub mod config;
pub mod datastore;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod redact;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{LogSink, RequestContext};
