//! Device authorization request: the single exchange that starts a flow.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DeviceGrantConfig;
use crate::error::DeviceGrantError;
use crate::http::{self, RawResponse};

const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Device-code session details returned by the device authorization endpoint.
///
/// # Example
/// ```
/// use device_grant::auth::DeviceAuthorization;
///
/// let authorization: DeviceAuthorization = serde_json::from_str(r#"{
///     "device_code": "GMMhmHCXhWEzkobqIHGG_EnNYYsAkukHspeYUk9E8",
///     "user_code": "WDJB-MJHT",
///     "verification_uri": "https://example.com/device",
///     "expires_in": 1800
/// }"#).unwrap();
/// assert_eq!(authorization.interval, 5);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_uri_complete: Option<String>,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeviceAuthorization {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

impl fmt::Debug for DeviceAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAuthorization")
            .field("device_code", &"..")
            .field("user_code", &self.user_code)
            .field("verification_uri", &self.verification_uri)
            .field("verification_uri_complete", &self.verification_uri_complete)
            .field("expires_in", &self.expires_in)
            .field("interval", &self.interval)
            .finish()
    }
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

/// Performs the initial device authorization request.
///
/// Exactly one request per call. A non-2xx response is a configuration
/// problem rather than a transient condition and is never retried.
pub struct DeviceAuthorizationRequester {
    client: reqwest::Client,
    config: DeviceGrantConfig,
}

impl DeviceAuthorizationRequester {
    pub fn new(config: DeviceGrantConfig) -> Result<Self, DeviceGrantError> {
        config.validate()?;
        let client = http::build_client(config.request_timeout())?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing client, e.g. one shared with the [`TokenPoller`](super::TokenPoller).
    pub fn with_client(client: reqwest::Client, config: DeviceGrantConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &DeviceGrantConfig {
        &self.config
    }

    pub async fn request(&self) -> Result<DeviceAuthorization, DeviceGrantError> {
        let url = self.config.device_code_url();
        let form = [
            ("client_id", self.config.client_id()),
            ("scope", self.config.scope()),
        ];
        let resp = self
            .config
            .retry()
            .execute(|| http::post_form(&self.client, &url, &form))
            .await?;
        parse_authorization(resp)
    }
}

fn parse_authorization(resp: RawResponse) -> Result<DeviceAuthorization, DeviceGrantError> {
    if !resp.is_success() {
        tracing::warn!(status = resp.status.as_u16(), "device authorization rejected");
        return Err(DeviceGrantError::protocol(resp.status.as_u16(), resp.body));
    }
    let authorization: DeviceAuthorization = resp.parse()?;
    tracing::debug!(
        expires_in = authorization.expires_in,
        interval = authorization.interval,
        "device authorization issued"
    );
    Ok(authorization)
}
