#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use device_grant::auth::{DeviceAuthorization, Sleeper};
use device_grant::config::DeviceGrantConfig;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";
pub const DEVICE_CODE_PATH: &str = "/tenant-1/oauth2/v2.0/devicecode";

/// Sleeper that records every requested delay and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn secs(&self) -> Vec<u64> {
        self.sleeps
            .lock()
            .expect("sleeper lock poisoned")
            .iter()
            .map(Duration::as_secs)
            .collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .expect("sleeper lock poisoned")
            .push(duration);
    }
}

/// Sleeper that records the delay and then never wakes up.
#[derive(Default)]
pub struct StalledSleeper {
    pub inner: RecordingSleeper,
}

#[async_trait]
impl Sleeper for StalledSleeper {
    async fn sleep(&self, duration: Duration) {
        self.inner.sleep(duration).await;
        std::future::pending::<()>().await;
    }
}

pub fn config(server: &MockServer) -> DeviceGrantConfig {
    DeviceGrantConfig::new(format!("{}/tenant-1/oauth2/v2.0", server.uri()), "client-123")
}

pub fn authorization(interval: u64) -> DeviceAuthorization {
    DeviceAuthorization {
        device_code: "device-code-1".to_string(),
        user_code: "ABCD-EFGH".to_string(),
        verification_uri: "https://microsoft.com/devicelogin".to_string(),
        verification_uri_complete: None,
        expires_in: 900,
        interval,
        message: None,
    }
}

pub fn device_code_body(interval: u64, expires_in: u64) -> Value {
    json!({
        "device_code": "device-code-1",
        "user_code": "ABCD-EFGH",
        "verification_uri": "https://microsoft.com/devicelogin",
        "expires_in": expires_in,
        "interval": interval
    })
}

pub fn token_body() -> Value {
    json!({
        "access_token": "access-1",
        "id_token": "id-1",
        "refresh_token": "refresh-1",
        "token_type": "Bearer",
        "expires_in": 3599,
        "scope": "openid profile offline_access"
    })
}

pub fn error_body(code: &str, description: &str) -> Value {
    json!({
        "error": code,
        "error_description": description
    })
}
