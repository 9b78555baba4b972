//! Provider error payloads returned by the token endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error codes a provider reports while polling.
///
/// Unknown codes are preserved verbatim in [`ProviderErrorCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderErrorCode {
    AuthorizationPending,
    SlowDown,
    AccessDenied,
    ExpiredToken,
    InvalidGrant,
    InvalidClient,
    InvalidRequest,
    InvalidScope,
    UnauthorizedClient,
    UnsupportedGrantType,
    AuthorizationDeclined,
    BadVerificationCode,
    Other(String),
}

impl ProviderErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::AccessDenied => "access_denied",
            Self::ExpiredToken => "expired_token",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidClient => "invalid_client",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidScope => "invalid_scope",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::AuthorizationDeclined => "authorization_declined",
            Self::BadVerificationCode => "bad_verification_code",
            Self::Other(code) => code,
        }
    }

    /// `authorization_pending` and `slow_down` keep the poll loop alive.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::AuthorizationPending | Self::SlowDown)
    }
}

impl From<&str> for ProviderErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "authorization_pending" => Self::AuthorizationPending,
            "slow_down" => Self::SlowDown,
            "access_denied" => Self::AccessDenied,
            "expired_token" => Self::ExpiredToken,
            "invalid_grant" => Self::InvalidGrant,
            "invalid_client" => Self::InvalidClient,
            "invalid_request" => Self::InvalidRequest,
            "invalid_scope" => Self::InvalidScope,
            "unauthorized_client" => Self::UnauthorizedClient,
            "unsupported_grant_type" => Self::UnsupportedGrantType,
            "authorization_declined" => Self::AuthorizationDeclined,
            "bad_verification_code" => Self::BadVerificationCode,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ProviderErrorCode {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProviderErrorCode> for String {
    fn from(code: ProviderErrorCode) -> Self {
        code.as_str().to_string()
    }
}

/// Error body of a non-2xx token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub error: ProviderErrorCode,
    #[serde(default)]
    pub error_description: String,
}

impl ProviderError {
    pub fn new(error: impl Into<ProviderErrorCode>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: description.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_description.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{} - {}", self.error, self.error_description)
        }
    }
}

impl std::error::Error for ProviderError {}
