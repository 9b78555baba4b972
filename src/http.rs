//! Shared HTTP plumbing for the provider endpoints.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::DeviceGrantError;

/// Build a client whose requests carry the given per-request timeout.
pub fn build_client(request_timeout: Duration) -> Result<reqwest::Client, DeviceGrantError> {
    Ok(reqwest::Client::builder()
        .timeout(request_timeout)
        .build()?)
}

/// Raw provider response; the body is read regardless of status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body, mapping malformed JSON to a protocol error.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, DeviceGrantError> {
        serde_json::from_str(&self.body)
            .map_err(|_| DeviceGrantError::protocol(self.status.as_u16(), self.body.clone()))
    }
}

/// POST a form-encoded body and collect status and body text.
pub async fn post_form(
    client: &reqwest::Client,
    url: &str,
    form: &[(&str, &str)],
) -> Result<RawResponse, DeviceGrantError> {
    let resp = client
        .post(url)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .form(form)
        .send()
        .await?;
    let status = resp.status();
    let body = resp.text().await?;
    tracing::debug!(endpoint = %url, status = status.as_u16(), "provider response");
    Ok(RawResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_keeps_status_and_body() {
        let raw = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>bad gateway</html>".to_string(),
        };
        let err = raw.parse::<serde_json::Value>().unwrap_err();
        match err {
            DeviceGrantError::Protocol { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }
}
