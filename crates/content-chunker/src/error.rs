use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur during content chunking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkerError {
    /// The size window is inverted
    #[error("Invalid policy: min_chars ({min_chars}) cannot exceed max_chars ({max_chars})")]
    InvalidPolicy { min_chars: usize, max_chars: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChunkerError {
    /// Create an inverted size window error
    #[must_use]
    pub const fn invalid_policy(min_chars: usize, max_chars: usize) -> Self {
        Self::InvalidPolicy {
            min_chars,
            max_chars,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
