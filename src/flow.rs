//! The full device flow: request a code, show it to the user, poll.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::{
    DeviceAuthorization, DeviceAuthorizationRequester, Sleeper, TokenPoller, TokenResult,
    UserPresenter,
};
use crate::config::DeviceGrantConfig;
use crate::error::DeviceGrantError;
use crate::http;
use crate::util::timeout::with_deadline;

/// Optional wall-clock limit on the polling phase.
///
/// The poll loop itself has no deadline; it relies on the provider to report
/// `expired_token`. A deadline is applied around the loop, never inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryDeadline {
    /// Poll until the provider reports a terminal outcome.
    #[default]
    Off,
    /// Stop once the device code's `expires_in` has elapsed.
    ProviderExpiry,
    /// Stop after a fixed duration.
    Fixed(Duration),
}

impl ExpiryDeadline {
    pub fn resolve(&self, authorization: &DeviceAuthorization) -> Option<Duration> {
        match self {
            Self::Off => None,
            Self::ProviderExpiry => Some(authorization.expires_in()),
            Self::Fixed(duration) => Some(*duration),
        }
    }
}

/// Runs the device authorization and token polling in sequence.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use device_grant::auth::RecordingPresenter;
/// use device_grant::config::DeviceGrantConfig;
/// use device_grant::flow::DeviceFlow;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> device_grant::error::Result<()> {
/// let config = DeviceGrantConfig::for_tenant("contoso.onmicrosoft.com", "my-client-id");
/// let flow = DeviceFlow::new(config, Arc::new(RecordingPresenter::new()))?;
/// let tokens = flow.run(&CancellationToken::new()).await?;
/// println!("{}", tokens.token_type);
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlow {
    requester: DeviceAuthorizationRequester,
    poller: TokenPoller,
    presenter: Arc<dyn UserPresenter>,
    open_browser: bool,
}

impl DeviceFlow {
    pub fn new(
        config: DeviceGrantConfig,
        presenter: Arc<dyn UserPresenter>,
    ) -> Result<Self, DeviceGrantError> {
        config.validate()?;
        let client = http::build_client(config.request_timeout())?;
        Ok(Self {
            requester: DeviceAuthorizationRequester::with_client(client.clone(), config.clone()),
            poller: TokenPoller::with_client(client, config),
            presenter,
            open_browser: true,
        })
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.poller = self.poller.with_sleeper(sleeper);
        self
    }

    /// Whether to ask the presenter to open the verification URI.
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn requester(&self) -> &DeviceAuthorizationRequester {
        &self.requester
    }

    pub fn poller(&self) -> &TokenPoller {
        &self.poller
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<TokenResult, DeviceGrantError> {
        let authorization = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DeviceGrantError::Cancelled),
            authorization = self.requester.request() => authorization?,
        };

        self.presenter.present(&authorization);
        if self.open_browser {
            if let Err(error) = self.presenter.open_uri(&authorization.verification_uri) {
                tracing::warn!(%error, "could not open browser");
            }
        }

        let polling = self.poller.poll_until_cancelled(&authorization, cancel);
        match self.poller.config().deadline().resolve(&authorization) {
            Some(deadline) => with_deadline(deadline, polling).await,
            None => polling.await,
        }
    }
}
