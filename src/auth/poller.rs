//! Token polling state machine.
//!
//! Each iteration sends one token request. `authorization_pending` keeps the
//! current delay, `slow_down` lengthens it *before* the following sleep, a
//! 2xx body ends the loop with a token set, and every other provider code
//! fails the flow immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use strum::Display;
use tokio_util::sync::CancellationToken;

use super::device_code::DeviceAuthorization;
use super::provider_error::{ProviderError, ProviderErrorCode};
use super::token::TokenResult;
use crate::config::DeviceGrantConfig;
use crate::error::DeviceGrantError;
use crate::http::{self, RawResponse};

pub const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Suspension between poll attempts.
///
/// Production code uses [`TokioSleeper`]; tests inject a recorder to observe
/// the backoff schedule without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Logical state of a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Pending,
    SlowedDown,
    Succeeded,
    Failed,
}

/// Interpretation of a single token endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Authorized(TokenResult),
    Pending,
    SlowDown,
}

impl PollStep {
    /// Classify a raw token endpoint response.
    ///
    /// Fatal provider codes come back as [`DeviceGrantError::Authorization`],
    /// bodies matching neither schema as [`DeviceGrantError::Protocol`].
    pub fn from_response(resp: &RawResponse) -> Result<Self, DeviceGrantError> {
        if resp.is_success() {
            return Ok(Self::Authorized(resp.parse()?));
        }
        let error: ProviderError = resp.parse()?;
        if !error.error.is_transient() {
            return Err(DeviceGrantError::Authorization(error));
        }
        match error.error {
            ProviderErrorCode::SlowDown => Ok(Self::SlowDown),
            _ => Ok(Self::Pending),
        }
    }
}

/// Exchanges a device code for tokens, honouring the provider's pacing.
pub struct TokenPoller {
    client: reqwest::Client,
    config: DeviceGrantConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl TokenPoller {
    pub fn new(config: DeviceGrantConfig) -> Result<Self, DeviceGrantError> {
        config.validate()?;
        let client = http::build_client(config.request_timeout())?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: DeviceGrantConfig) -> Self {
        Self {
            client,
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &DeviceGrantConfig {
        &self.config
    }

    /// Poll until the provider returns tokens or a fatal error.
    pub async fn poll(
        &self,
        authorization: &DeviceAuthorization,
    ) -> Result<TokenResult, DeviceGrantError> {
        self.poll_until_cancelled(authorization, &CancellationToken::new())
            .await
    }

    /// Poll until the provider returns tokens or a fatal error, or until
    /// `cancel` fires. Cancellation interrupts both the in-flight request and
    /// the sleep between attempts.
    pub async fn poll_until_cancelled(
        &self,
        authorization: &DeviceAuthorization,
        cancel: &CancellationToken,
    ) -> Result<TokenResult, DeviceGrantError> {
        let mut delay = authorization.interval();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let resp = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeviceGrantError::Cancelled),
                resp = self.exchange(authorization) => resp?,
            };

            let state = match PollStep::from_response(&resp) {
                Ok(PollStep::Authorized(token)) => {
                    tracing::info!(attempt, state = %PollState::Succeeded, "device authorization completed");
                    return Ok(token);
                }
                Ok(PollStep::Pending) => PollState::Pending,
                Ok(PollStep::SlowDown) => {
                    delay = delay.saturating_add(self.config.slow_down_increment());
                    PollState::SlowedDown
                }
                Err(err) => {
                    tracing::info!(attempt, state = %PollState::Failed, error = %err, "device authorization failed");
                    return Err(err);
                }
            };

            tracing::debug!(attempt, %state, delay_secs = delay.as_secs(), "authorization not complete yet");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeviceGrantError::Cancelled),
                _ = self.sleeper.sleep(delay) => {}
            }
        }
    }

    async fn exchange(
        &self,
        authorization: &DeviceAuthorization,
    ) -> Result<RawResponse, DeviceGrantError> {
        let url = self.config.token_url();
        let form = [
            ("grant_type", DEVICE_CODE_GRANT_TYPE),
            ("device_code", authorization.device_code.as_str()),
            ("client_id", self.config.client_id()),
        ];
        self.config
            .retry()
            .execute(|| http::post_form(&self.client, &url, &form))
            .await
    }
}
