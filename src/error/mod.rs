//! Error types for the device grant flow.

use thiserror::Error;

use crate::auth::ProviderError;

/// Primary error type for all device-grant operations.
#[derive(Error, Debug)]
pub enum DeviceGrantError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol error (status {status}): {body}")]
    Protocol { status: u16, body: String },

    #[error("Authorization failed: {0}")]
    Authorization(ProviderError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Device authorization was cancelled")]
    Cancelled,

    #[error("Device authorization not completed within {after_secs}s")]
    DeadlineExceeded { after_secs: u64 },
}

/// Coarse classification of a [`DeviceGrantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Protocol,
    Authorization,
    Network,
    Cancelled,
    Timeout,
}

impl DeviceGrantError {
    /// Create a protocol error from a raw status and body.
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Protocol { .. } => ErrorCategory::Protocol,
            Self::Authorization(_) => ErrorCategory::Authorization,
            Self::Network(_) => ErrorCategory::Network,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::DeadlineExceeded { .. } => ErrorCategory::Timeout,
        }
    }

    /// Whether an opt-in retry policy may repeat the failed request.
    ///
    /// Only transport failures qualify. Provider errors are already the
    /// provider's final word and protocol errors indicate a configuration bug.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network)
    }

    /// The structured provider error, if the provider rejected the grant.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Authorization(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ProviderError> for DeviceGrantError {
    fn from(error: ProviderError) -> Self {
        Self::Authorization(error)
    }
}

impl From<toml::de::Error> for DeviceGrantError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DeviceGrantError>;
