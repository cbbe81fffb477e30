//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app with the pattern router as its only service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Serve until the shutdown signal fires

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::service::SharedRouter;

/// HTTP server fronting a [`SharedRouter`].
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
    router: SharedRouter,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: impl Into<SharedRouter>) -> Self {
        let router = router.into();
        let app = Self::build_app(&config, &router);
        Self {
            app,
            config,
            router,
        }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, router: &SharedRouter) -> axum::Router {
        axum::Router::new()
            .fallback_service(router.service())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Handle for swapping the route table while serving.
    pub fn router(&self) -> &SharedRouter {
        &self.router
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            patterns = self.router.load().registered_patterns().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
