#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod health;
mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use readaloud_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a feature's state cannot be built or the page templates fail to compile
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let identity_state = identity::build_state(config)?;
        let paragraph_state = paragraph::build_state(config)?;
        let assessment_state = assessment::build_state(config)?;
        let tts_state = tts::build_state(config)?;
        let pages = Arc::new(pages::Pages::new().map_err(|e| anyhow::anyhow!("Failed to load page templates: {e}"))?);

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Pages
        app = app.merge(pages::page_router().with_state(pages));

        // Login, callback and logout
        app = app.merge(identity::endpoint_router().with_state(Arc::clone(&identity_state)));

        // Practice paragraphs
        app = app.merge(paragraph::endpoint_router().with_state(paragraph_state));

        // Pronunciation assessment and speech tokens
        app = app.merge(assessment::endpoint_router().with_state(assessment_state));

        // Speech synthesis
        app = app.merge(tts::endpoint_router().with_state(tts_state));

        // Session resolution (innermost, runs just before handlers)
        app = app.layer(axum::middleware::from_fn_with_state(
            identity_state,
            identity::session_middleware,
        ));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    pub const fn set_listen_address(&mut self, address: SocketAddr) {
        self.listen_address = address;
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
