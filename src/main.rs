//! patmux demo server.
//!
//! ```text
//! GET /hello/:name   → "Hello, <name>"
//! GET /splat/        → echoes whatever follows /splat/
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use patmux::config::{load_config, ServerConfig};
use patmux::observability::{logging, metrics};
use patmux::routing::tail;
use patmux::{Body, HttpServer, Request, RequestParamsExt, Router, Shutdown};

#[derive(Parser)]
#[command(name = "patmux")]
#[command(about = "Pattern-based HTTP request multiplexer", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

async fn hello(req: Request<Body>) -> String {
    let name = req.param(":name").unwrap_or_default();
    format!("Hello, {name}")
}

async fn splat(req: Request<Body>) -> String {
    format!("splat: {}", tail("/splat/", req.uri().path()))
}

fn routes(config: &ServerConfig) -> Router {
    let mut router = Router::with_config(config.router.clone());
    router.get("/hello/:name", hello).get("/splat/", splat);
    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("patmux v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        redirect_trailing_slash = config.router.redirect_trailing_slash,
        handle_method_not_allowed = config.router.handle_method_not_allowed,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let router = routes(&config);
    let server = HttpServer::new(config, router);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move { shutdown.trigger_on_signal().await });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
