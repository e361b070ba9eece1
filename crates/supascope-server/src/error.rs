//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use supascope_oauth::OAuthError;
use supascope_provider::ProviderError;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required parameter was missing or malformed.
    #[error("Bad request: {0}")]
    InvalidRequest(String),

    /// The CSRF state correlator was missing or did not match.
    #[error("OAuth state mismatch")]
    InvalidFlowState,

    /// No stored verifier for this authorization attempt.
    #[error("Code verifier not found")]
    VerifierNotFound,

    /// No valid session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The provider rejected the token exchange.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchange { status: u16, message: String },

    /// The management API answered with a non-2xx status.
    #[error("Upstream error {status}: {status_text}")]
    Upstream { status: u16, status_text: String },

    /// The management API returned a body we could not decode.
    #[error("Upstream returned an unexpected payload: {0}")]
    UpstreamDecode(String),

    /// The management API could not be reached.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The aggregate upstream operation exceeded its time budget.
    #[error("Upstream timeout")]
    UpstreamTimeout,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OAuthError> for ServerError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::InvalidRequest(msg) => ServerError::InvalidRequest(msg),
            OAuthError::InvalidFlowState => ServerError::InvalidFlowState,
            OAuthError::VerifierNotFound => ServerError::VerifierNotFound,
            OAuthError::TokenExchangeFailed { status, message } => {
                ServerError::TokenExchange { status, message }
            }
            OAuthError::Network(msg) => ServerError::UpstreamUnreachable(msg),
            OAuthError::Decode(msg) => ServerError::UpstreamDecode(msg),
        }
    }
}

impl From<ProviderError> for ServerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Upstream {
                status,
                status_text,
            } => ServerError::Upstream {
                status,
                status_text,
            },
            ProviderError::Unreachable(msg) => ServerError::UpstreamUnreachable(msg),
            ProviderError::Timeout => ServerError::UpstreamTimeout,
            ProviderError::Decode(msg) => ServerError::UpstreamDecode(msg),
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ServerError::InvalidFlowState => (StatusCode::BAD_REQUEST, "invalid_flow_state"),
            ServerError::VerifierNotFound => (StatusCode::BAD_REQUEST, "verifier_not_found"),
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServerError::TokenExchange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "token_exchange_failed")
            }
            ServerError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ServerError::UpstreamDecode(_) => (StatusCode::BAD_GATEWAY, "upstream_decode_error"),
            ServerError::UpstreamUnreachable(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_unreachable")
            }
            ServerError::UpstreamTimeout => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %message, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %message, "Client error");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
