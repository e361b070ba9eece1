//! Authorization URL construction and token exchange.
//!
//! The token endpoint is authenticated with HTTP Basic client credentials
//! and a form-encoded body, which is what the Supabase management API
//! expects. The `redirect_uri` sent here must match the one used in the
//! authorization request byte for byte.

use serde::Deserialize;

use crate::error::{OAuthError, Result};

/// Supabase management API OAuth endpoints.
pub const SUPABASE_AUTHORIZE_URL: &str = "https://api.supabase.com/v1/oauth/authorize";
pub const SUPABASE_TOKEN_URL: &str = "https://api.supabase.com/v1/oauth/token";

/// Default scope requested from the provider.
pub const DEFAULT_SCOPE: &str = "all";

/// OAuth client configuration for the Supabase provider.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthConfig {
    /// Config against the real Supabase endpoints.
    pub fn supabase(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            authorize_url: SUPABASE_AUTHORIZE_URL.to_string(),
            token_url: SUPABASE_TOKEN_URL.to_string(),
            redirect_uri,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

// client_secret must never leak through Debug formatting.
impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Server-side record of one in-flight authorization attempt.
///
/// Created when the user agent is redirected out, consumed exactly once by
/// the callback, or dropped when its TTL lapses.
#[derive(Clone)]
pub struct OAuthAttempt {
    pub verifier: String,
    pub state: String,
}

impl std::fmt::Debug for OAuthAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthAttempt")
            .field("verifier", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

/// Build the provider authorization URL.
pub fn build_authorization_url(config: &OAuthConfig, challenge: &str, state: &str) -> String {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", config.scope.as_str()),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}

/// Token set issued by the provider.
#[derive(Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

// Token material is the one thing this service must never log.
impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Exchange an authorization code for a token set.
///
/// Authorization codes are single-use; this call is never retried. A failed
/// exchange surfaces the provider status immediately.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenSet> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", verifier),
    ];

    let response = http
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("token request failed: {}", e)))?;

    read_token_response(response).await
}

/// Refresh an access token using a refresh token.
pub async fn refresh_tokens(
    http: &reqwest::Client,
    config: &OAuthConfig,
    refresh_token: &str,
) -> Result<TokenSet> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = http
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("token refresh failed: {}", e)))?;

    read_token_response(response).await
}

async fn read_token_response(response: reqwest::Response) -> Result<TokenSet> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::warn!(status = status.as_u16(), "Token endpoint rejected the request");
        return Err(OAuthError::TokenExchangeFailed {
            status: status.as_u16(),
            message: truncate(&message, 256),
        });
    }

    response
        .json::<TokenSet>()
        .await
        .map_err(|e| OAuthError::Decode(format!("token response: {}", e)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}
