//! HTTP server exposing the validation pipeline

use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::signal;
use torrent::TorrentValidator;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{healthcheck, session_cookies, validate_url};
use crate::logging::access_log;
use crate::state::ServerState;

/// API server for validating torrent URLs
#[derive(Clone)]
pub struct ApiServer {
    state: ServerState,
    cookie_debug: bool,
}

impl ApiServer {
    /// Create a new API server
    ///
    /// # Arguments
    /// * `validator` - Validation pipeline shared by all requests
    /// * `cookie_debug` - Whether to mount the session cookie listing
    pub fn new(validator: TorrentValidator, cookie_debug: bool) -> Self {
        Self {
            state: ServerState::new(validator),
            cookie_debug,
        }
    }

    /// Get the server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/validate-url", post(validate_url))
            .route("/healthcheck", get(healthcheck));

        if self.cookie_debug {
            router = router.route("/tl-cookies", get(session_cookies));
        }

        router.with_state(self.state.clone()).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(access_log)),
        )
    }

    /// Start the API server and run until Ctrl+C
    ///
    /// # Arguments
    /// * `host` - Host to bind to (e.g., "0.0.0.0")
    /// * `port` - Port to bind to (e.g., 8080)
    pub async fn serve(self, host: &str, port: u16) -> crate::Result<()> {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!(
            address = %addr,
            cookie_debug = self.cookie_debug,
            "API server listening on {}",
            addr
        );

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
    }
}
