//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request timeout, request/response capture)
//! - Serve on a listener until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::AppConfig;
use crate::http::middleware::{layer_capture, CaptureState};
use crate::http::response::ApiResponse;
use crate::log_info;
use crate::observability::RequestContext;

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if a skip pattern does not compile, which config
    /// validation already rules out.
    pub fn new(config: AppConfig) -> Result<Self, regex::Error> {
        let capture = Arc::new(CaptureState::from_config(&config.logging)?);
        let router = Self::build_router(&config, capture);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The timeout sits inside the capture layers so timed-out requests are
    /// still logged with their 408 status.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, capture: Arc<CaptureState>) -> Router {
        let router = Router::new()
            .route("/ping", get(ping))
            .layer(TimeoutLayer::new(config.server.request_timeout()));
        layer_capture(router, capture)
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let ctx = RequestContext::background();
        let addr = listener.local_addr()?;
        log_info!(ctx, address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        log_info!(ctx, "HTTP server stopped");
        Ok(())
    }
}

async fn ping(ctx: RequestContext) -> ApiResponse<&'static str> {
    log_info!(ctx, "ping");
    ApiResponse::success(&ctx, "pong")
}
