//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM both request a graceful shutdown.

use crate::log_info;
use crate::observability::RequestContext;

/// Resolve when the process is asked to stop.
///
/// If a handler cannot be installed that signal is ignored and the other one
/// still works.
pub async fn wait_for_signal() {
    let ctx = RequestContext::background();

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            crate::log_error!(ctx, error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                crate::log_error!(ctx, error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log_info!(ctx, "Shutdown signal received");
}
