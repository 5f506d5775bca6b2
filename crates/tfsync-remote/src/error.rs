//! Remote store errors

/// Errors raised talking to the transformations API
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("batch publish rejected: {0}")]
    PublishRejected(String),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Whether retrying the same request could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
