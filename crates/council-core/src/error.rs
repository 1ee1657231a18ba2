//! Error types shared across Council crates.

/// Every fallible Council operation returns this error.
#[derive(Debug, thiserror::Error)]
pub enum CouncilError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Knowledge error: {0}")]
    Knowledge(String),

    #[error("Vector index error: {0}")]
    Index(String),
}

impl CouncilError {
    /// Shorthand for a provider failure.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Whether this error came from talking to the model service
    /// (transport, timeout or non-success status).
    pub fn is_request_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Provider(_))
    }
}

pub type Result<T> = std::result::Result<T, CouncilError>;
