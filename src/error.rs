use std::time::Duration;

/// Failures surfaced by the chain core (catalog, random policy, orchestrator, cache).
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown language: '{0}'")]
    UnknownLanguage(String),

    #[error("Invalid range: [{lo}, {hi}]")]
    InvalidRange { lo: usize, hi: usize },

    #[error("Translation hop {hop} ({from} -> {to}) failed: {source}")]
    ProviderFailure {
        /// Zero-based index of the failed hop; the return hop to the origin counts.
        hop: usize,
        from: String,
        to: String,
        #[source]
        source: ProviderError,
    },

    #[error("Recent translations cache is empty")]
    EmptyCache,
}

/// Failures reported by a translation provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Network errors, timeouts, 429 and 5xx (except 501 "direction not supported")
    /// are worth retrying. Other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => {
                *status == 429 || (*status >= 500 && *status != 501)
            }
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::MalformedResponse(_) => false,
        }
    }
}
