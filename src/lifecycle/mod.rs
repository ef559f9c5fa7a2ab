//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config + log sink → HTTP server → bind → serve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     broadcast → stop accepting → drain (grace period) → flush logs → exit
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, flush
//! - Shutdown has a deadline: the server task is abandoned after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
