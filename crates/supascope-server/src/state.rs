//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use supascope_oauth::{MemoryStore, OAuthAttempt, SharedStore, TokenSet};
use supascope_provider::ManagementClient;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::routes::projects::LocalProject;

/// In-memory registry of user-entered project records.
pub type ProjectRegistry = Arc<RwLock<HashMap<String, LocalProject>>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Open authorization attempts, keyed by attempt id.
    pub attempts: SharedStore<OAuthAttempt>,

    /// Issued token sets, keyed by session id. Tokens live only here;
    /// the browser holds the opaque id.
    pub sessions: SharedStore<TokenSet>,

    /// User-entered project records.
    pub registry: ProjectRegistry,

    /// Management API client.
    pub provider: Arc<ManagementClient>,

    /// HTTP client for the token endpoint.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create application state from a configuration.
    pub fn new(config: ServerConfig) -> Self {
        let provider = ManagementClient::with_base_url(config.api_base_url.clone());

        Self {
            config: Arc::new(config),
            attempts: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemoryStore::new()),
            registry: Arc::new(RwLock::new(HashMap::new())),
            provider: Arc::new(provider),
            http: reqwest::Client::new(),
        }
    }

    /// Swap in a different attempt store backend.
    pub fn with_attempt_store(mut self, store: SharedStore<OAuthAttempt>) -> Self {
        self.attempts = store;
        self
    }

    /// Swap in a different session store backend.
    pub fn with_session_store(mut self, store: SharedStore<TokenSet>) -> Self {
        self.sessions = store;
        self
    }
}
