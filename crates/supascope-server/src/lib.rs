//! HTTP surface for the supascope dashboard.
//!
//! One router carries the whole system: the OAuth connect flow
//! (`/login`, `/callback`, `/logout`), the authenticated pass-through
//! routes to the Supabase management API, and the dashboard glue page.
//!
//! # Example
//!
//! ```ignore
//! use supascope_oauth::OAuthConfig;
//! use supascope_server::{Server, ServerConfig};
//!
//! let oauth = OAuthConfig::supabase(client_id, client_secret, redirect_uri);
//! let config = ServerConfig::new(oauth)
//!     .with_bind_address("127.0.0.1:8080".parse()?);
//!
//! Server::new(config).run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{ATTEMPT_COOKIE, SESSION_COOKIE, SessionIdentity};
pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// How often expired attempts and sessions are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// The supascope HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server from a configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let authenticated = Router::new()
            .route(
                "/projects",
                get(routes::list_projects_handler).post(routes::create_project_handler),
            )
            .route("/organizations", get(routes::list_organizations_handler))
            .route(
                "/projects/{project_ref}/pitr-status",
                get(routes::pitr_status_handler),
            )
            .route(
                "/projects/{project_ref}/database/query",
                post(routes::run_query_handler),
            )
            .route("/logout", post(routes::logout_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::session_middleware,
            ));

        let mut router = Router::new()
            .merge(routes::health_routes())
            .route("/login", get(routes::login_handler))
            .route("/callback", get(routes::callback_handler))
            .route("/dashboard", get(routes::dashboard_handler))
            .merge(authenticated)
            .layer(CookieManagerLayer::new())
            .layer(TraceLayer::new_for_http());

        if let Some(cors) = self.cors_layer() {
            router = router.layer(cors);
        }

        router.with_state(self.state.clone())
    }

    /// CORS layer for the configured origins, with credentials so the
    /// session cookie travels with browser fetches.
    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true),
        )
    }

    /// Sweep expired attempts and sessions in the background.
    fn spawn_purge_task(&self) {
        let attempts = self.state.attempts.clone();
        let sessions = self.state.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                attempts.purge_expired().await;
                sessions.purge_expired().await;
            }
        });
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.spawn_purge_task();
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.state.config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        self.spawn_purge_task();
        let router = self.router();

        info!(addr = %local_addr, "Starting server");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
