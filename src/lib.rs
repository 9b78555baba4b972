//! device-grant — OAuth 2.0 Device Authorization Grant client
//!
//! Requests a device/user code pair, hands the verification URI and user code
//! to a [`UserPresenter`](auth::UserPresenter), then polls the token endpoint
//! until the user completes sign-in, the provider rejects the grant, or the
//! caller cancels.
//!
//! # Quick Start
//!
//! ```no_run
//! use device_grant::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> device_grant::error::Result<()> {
//! let config = DeviceGrantConfig::for_tenant("contoso.onmicrosoft.com", "my-client-id");
//! let requester = DeviceAuthorizationRequester::new(config.clone())?;
//! let authorization = requester.request().await?;
//! println!("Visit {} and enter {}", authorization.verification_uri, authorization.user_code);
//!
//! let poller = TokenPoller::new(config)?;
//! let tokens = poller
//!     .poll_until_cancelled(&authorization, &CancellationToken::new())
//!     .await?;
//! println!("{}", tokens.access_token);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod prelude;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
