//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout)
//!     → middleware/ (trace id, AccessLog, ResponseLog)
//!     → handler (extracts RequestContext via request.rs)
//!     → response.rs (JSON envelope carrying the trace id)
//!     → Send to client
//!
//! Outbound calls:
//!     client.rs (x-trace-id propagated)
//! ```

pub mod client;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use client::TracedClient;
pub use middleware::{CaptureBody, CaptureState};
pub use request::client_ip;
pub use response::ApiResponse;
pub use server::HttpServer;
