//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use supascope_oauth::OAuthConfig;
use supascope_provider::SUPABASE_API_URL;

use crate::error::{Result, ServerError};

/// How long an authorization attempt may stay open before the stored
/// verifier is discarded.
pub const DEFAULT_ATTEMPT_TTL: Duration = Duration::from_secs(10 * 60);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// OAuth client registration for the Supabase provider.
    pub oauth: OAuthConfig,

    /// Management API base URL.
    pub api_base_url: String,

    /// Where the callback sends the user agent after a successful connect.
    pub dashboard_path: String,

    /// Set the `Secure` attribute on cookies. Disabled only for local
    /// plain-HTTP development and tests.
    pub secure_cookies: bool,

    /// TTL for stored verifiers.
    pub attempt_ttl: Duration,

    /// CORS allowed origins (empty = no CORS layer).
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Create a config with the given OAuth client registration.
    pub fn new(oauth: OAuthConfig) -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            oauth,
            api_base_url: SUPABASE_API_URL.to_string(),
            dashboard_path: "/dashboard".to_string(),
            secure_cookies: true,
            attempt_ttl: DEFAULT_ATTEMPT_TTL,
            cors_origins: Vec::new(),
        }
    }

    /// Read the configuration from `SUPASCOPE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let client_id = require_env("SUPASCOPE_CLIENT_ID")?;
        let client_secret = require_env("SUPASCOPE_CLIENT_SECRET")?;
        let redirect_uri = require_env("SUPASCOPE_REDIRECT_URI")?;

        let mut config = Self::new(OAuthConfig::supabase(client_id, client_secret, redirect_uri));

        if let Ok(bind) = std::env::var("SUPASCOPE_BIND") {
            config.bind_address = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("SUPASCOPE_BIND: {}", e)))?;
        }
        if let Ok(base) = std::env::var("SUPASCOPE_API_URL") {
            config.api_base_url = base;
        }
        if let Ok(origins) = std::env::var("SUPASCOPE_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(insecure) = std::env::var("SUPASCOPE_INSECURE_COOKIES") {
            config.secure_cookies = insecure != "1" && insecure.to_lowercase() != "true";
        }

        Ok(config)
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the management API base URL.
    pub fn with_api_base_url(mut self, base_url: String) -> Self {
        self.api_base_url = base_url;
        self
    }

    /// Enable or disable the `Secure` cookie attribute.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Set the verifier TTL.
    pub fn with_attempt_ttl(mut self, ttl: Duration) -> Self {
        self.attempt_ttl = ttl;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ServerError::Config(format!("{} is not set", name)))
        .and_then(|v| {
            if v.is_empty() {
                Err(ServerError::Config(format!("{} is empty", name)))
            } else {
                Ok(v)
            }
        })
}
