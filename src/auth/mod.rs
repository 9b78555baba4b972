//! OAuth 2.0 device authorization grant: request, presentation and polling.

pub mod device_code;
pub mod poller;
pub mod presenter;
pub mod provider_error;
pub mod token;

pub use device_code::{DeviceAuthorization, DeviceAuthorizationRequester};
pub use poller::{PollState, PollStep, Sleeper, TokenPoller, TokioSleeper, DEVICE_CODE_GRANT_TYPE};
pub use presenter::{RecordingPresenter, UserPresenter};
pub use provider_error::{ProviderError, ProviderErrorCode};
pub use token::TokenResult;
