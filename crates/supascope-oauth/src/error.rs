//! Error types for the OAuth flow.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur during the authorization flow.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// A required parameter was missing or malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The CSRF state correlator was missing or did not match the one issued.
    #[error("OAuth state mismatch")]
    InvalidFlowState,

    /// No stored verifier for this attempt (expired, consumed, or never issued).
    #[error("Code verifier not found for this authorization attempt")]
    VerifierNotFound,

    /// The provider's token endpoint rejected the exchange.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed { status: u16, message: String },

    /// Network/HTTP error talking to the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider returned a body we could not decode.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
