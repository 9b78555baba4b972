//! Convenience re-exports for common use.

pub use crate::auth::{
    DeviceAuthorization, DeviceAuthorizationRequester, ProviderError, ProviderErrorCode,
    TokenPoller, TokenResult, UserPresenter,
};
pub use crate::config::DeviceGrantConfig;
pub use crate::error::{DeviceGrantError, Result};
pub use crate::flow::{DeviceFlow, ExpiryDeadline};
