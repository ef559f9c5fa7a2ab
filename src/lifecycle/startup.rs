//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the HTTP server from validated configuration
//! - Bind the listener and begin accepting traffic
//! - On a shutdown signal, drain within the grace period, then flush logs
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to `main`, which logs it fatally
//! - The log sink is created by the caller and flushed here, last

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{LogSink, RequestContext};
use crate::{log_info, log_warn};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid skip path pattern: {0}")]
    SkipPattern(#[from] regex::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("failed to flush logs: {0}")]
    Flush(std::io::Error),
}

/// Bind the configured address and serve until a termination signal.
pub async fn run(config: AppConfig, sink: Arc<LogSink>) -> Result<(), StartupError> {
    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    serve(config, listener, sink, crate::lifecycle::signals::wait_for_signal()).await
}

/// Serve on `listener` until `stop` resolves.
///
/// In-flight requests get `shutdown_grace_secs` to finish; after that the
/// server task is abandoned. The sink is flushed either way.
pub async fn serve<F>(
    config: AppConfig,
    listener: TcpListener,
    sink: Arc<LogSink>,
    stop: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let ctx = RequestContext::background();
    let grace = config.server.shutdown_grace();

    log_info!(
        ctx,
        profile = %config.application.profile,
        log_dir = %config.logging.dir.display(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let served = tokio::select! {
        joined = &mut server_task => Some(joined),
        _ = stop => None,
    };

    let result = match served {
        Some(joined) => joined_result(joined),
        None => {
            shutdown.trigger();
            match tokio::time::timeout(grace, &mut server_task).await {
                Ok(joined) => joined_result(joined),
                Err(_) => {
                    log_warn!(ctx, grace = ?grace, "Server forced to shutdown");
                    server_task.abort();
                    Ok(())
                }
            }
        }
    };

    log_info!(ctx, "Shutdown complete");
    sink.sync().map_err(StartupError::Flush)?;
    result
}

fn joined_result(
    joined: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), StartupError> {
    match joined {
        Ok(result) => result.map_err(StartupError::Serve),
        Err(e) => Err(StartupError::Serve(std::io::Error::other(e))),
    }
}
