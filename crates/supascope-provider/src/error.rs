//! Error types for management API calls.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur talking to the management API.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The API answered with a non-2xx status.
    #[error("Upstream error {status}: {status_text}")]
    Upstream { status: u16, status_text: String },

    /// The API could not be reached.
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// The aggregate operation exceeded its time budget.
    #[error("Upstream timeout")]
    Timeout,

    /// The API returned a body that did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ProviderError {
    pub(crate) fn upstream(status: reqwest::StatusCode) -> Self {
        ProviderError::Upstream {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }
}
