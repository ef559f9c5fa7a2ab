//! top-ping API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ access_log ──▶ response_log ──▶ timeout ──▶ handler
//!                     (trace id,     (timer,                      (RequestContext
//!                      AccessLog)     CaptureBody)                 extractor)
//!     ◀────────────── ResponseLog emitted when the body finishes streaming
//!
//!     every log call ──▶ tracing ──▶ LogSink layer ──▶ default.log / error.log
//!                                                      (+ stdout in dev)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use top_ping::config::load_config;
use top_ping::lifecycle::startup;
use top_ping::observability::{LogSink, RequestContext};

#[derive(Debug, Parser)]
#[command(name = "top-ping", about = "top-ping api server", version)]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = "configs/application.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Server,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let sink = Arc::new(LogSink::new(&config.logging, config.application.profile)?);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.logging.min_severity().filter_directive();
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(sink.layer())
        .init();

    let ctx = RequestContext::background();
    top_ping::log_info!(
        ctx,
        config = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "top-ping starting"
    );

    match cli.command {
        Command::Server => {
            if let Err(e) = startup::run(config, sink).await {
                top_ping::log_fatal!(ctx, error = %e, "server failed");
            }
        }
    }

    Ok(())
}
