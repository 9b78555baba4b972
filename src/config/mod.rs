//! Configuration (layered: code > env > config file).
//!
//! A [`DeviceGrantConfig`] is built once and handed to both the
//! [`DeviceAuthorizationRequester`](crate::auth::DeviceAuthorizationRequester)
//! and the [`TokenPoller`](crate::auth::TokenPoller). Nothing is read from
//! process-wide state after construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::DeviceGrantError;
use crate::flow::ExpiryDeadline;
use crate::util::retry::RetryPolicy;

pub const DEFAULT_SCOPE: &str = "openid profile offline_access";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

const MICROSOFT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Settings shared by every step of one device authorization flow.
#[derive(Debug, Clone)]
pub struct DeviceGrantConfig {
    issuer: String,
    client_id: String,
    scope: String,
    request_timeout: Duration,
    slow_down_increment: Duration,
    retry: RetryPolicy,
    deadline: ExpiryDeadline,
}

impl DeviceGrantConfig {
    /// Create a config for an issuer base URL, e.g.
    /// `https://login.microsoftonline.com/<tenant>/oauth2/v2.0`.
    pub fn new(issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
        let issuer: String = issuer.into();
        Self {
            issuer: issuer.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            scope: DEFAULT_SCOPE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            slow_down_increment: DEFAULT_SLOW_DOWN_INCREMENT,
            retry: RetryPolicy::none(),
            deadline: ExpiryDeadline::Off,
        }
    }

    /// Create a config for a Microsoft identity platform tenant.
    pub fn for_tenant(tenant: &str, client_id: impl Into<String>) -> Self {
        Self::new(tenant_issuer(tenant), client_id)
    }

    /// Load from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, DeviceGrantError> {
        ConfigFile::from_env()?.into_config()
    }

    /// Load from a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeviceGrantError> {
        ConfigFile::from_path(path.as_ref())?.into_config()
    }

    /// Load the config file (explicit path, or the default path if it
    /// exists) and overlay environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, DeviceGrantError> {
        Self::load_with(path, ConfigFile::default())
    }

    /// Like [`load`](Self::load), with an extra top layer (e.g. CLI flags).
    pub fn load_with(
        path: Option<&Path>,
        overrides: ConfigFile,
    ) -> Result<Self, DeviceGrantError> {
        let file = match path {
            Some(path) => ConfigFile::from_path(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    ConfigFile::from_path(&default_path)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        file.merge(ConfigFile::from_env()?)
            .merge(overrides)
            .into_config()
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_slow_down_increment(mut self, increment: Duration) -> Self {
        self.slow_down_increment = increment;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_deadline(mut self, deadline: ExpiryDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn slow_down_increment(&self) -> Duration {
        self.slow_down_increment
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn deadline(&self) -> ExpiryDeadline {
        self.deadline
    }

    pub fn device_code_url(&self) -> String {
        format!("{}/devicecode", self.issuer)
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.issuer)
    }

    /// Reject configs that cannot possibly produce a valid request.
    pub fn validate(&self) -> Result<(), DeviceGrantError> {
        if self.client_id.trim().is_empty() {
            return Err(DeviceGrantError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }
        let url = reqwest::Url::parse(&self.issuer).map_err(|e| {
            DeviceGrantError::Configuration(format!("invalid issuer '{}': {e}", self.issuer))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DeviceGrantError::Configuration(format!(
                "issuer must be an http(s) URL, got '{}'",
                self.issuer
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(DeviceGrantError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Issuer base URL for a Microsoft identity platform tenant.
pub fn tenant_issuer(tenant: &str) -> String {
    format!("{MICROSOFT_AUTHORITY}/{}/oauth2/v2.0", tenant.trim())
}

/// Default config file path (`~/.device-grant/config.toml`).
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".device-grant"))
        .unwrap_or_else(|| PathBuf::from(".device-grant"))
        .join("config.toml")
}

/// One configuration layer. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub issuer: Option<String>,
    pub tenant: Option<String>,
    pub client_id: Option<String>,
    pub scope: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub slow_down_increment_secs: Option<u64>,
    pub max_network_attempts: Option<u32>,
    pub enforce_expiry: Option<bool>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self, DeviceGrantError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DeviceGrantError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Read the `DEVICE_GRANT_*` environment variables.
    pub fn from_env() -> Result<Self, DeviceGrantError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a layer from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DeviceGrantError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            issuer: get("DEVICE_GRANT_ISSUER"),
            tenant: get("DEVICE_GRANT_TENANT"),
            client_id: get("DEVICE_GRANT_CLIENT_ID"),
            scope: get("DEVICE_GRANT_SCOPE"),
            request_timeout_secs: parse_var("DEVICE_GRANT_REQUEST_TIMEOUT_SECS", &get)?,
            slow_down_increment_secs: parse_var("DEVICE_GRANT_SLOW_DOWN_INCREMENT_SECS", &get)?,
            max_network_attempts: parse_var("DEVICE_GRANT_MAX_NETWORK_ATTEMPTS", &get)?,
            enforce_expiry: parse_var("DEVICE_GRANT_ENFORCE_EXPIRY", &get)?,
        })
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    ///
    /// An explicit issuer in the upper layer also shadows a tenant from the
    /// lower layer and vice versa.
    pub fn merge(self, other: ConfigFile) -> ConfigFile {
        let (issuer, tenant) = if other.issuer.is_some() || other.tenant.is_some() {
            (other.issuer, other.tenant)
        } else {
            (self.issuer, self.tenant)
        };
        ConfigFile {
            issuer,
            tenant,
            client_id: other.client_id.or(self.client_id),
            scope: other.scope.or(self.scope),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            slow_down_increment_secs: other
                .slow_down_increment_secs
                .or(self.slow_down_increment_secs),
            max_network_attempts: other.max_network_attempts.or(self.max_network_attempts),
            enforce_expiry: other.enforce_expiry.or(self.enforce_expiry),
        }
    }

    pub fn into_config(self) -> Result<DeviceGrantConfig, DeviceGrantError> {
        let issuer = match (self.issuer, self.tenant) {
            (Some(issuer), _) => issuer,
            (None, Some(tenant)) => tenant_issuer(&tenant),
            (None, None) => {
                return Err(DeviceGrantError::Configuration(
                    "an issuer or tenant is required".to_string(),
                ))
            }
        };
        let client_id = self.client_id.ok_or_else(|| {
            DeviceGrantError::Configuration("a client id is required".to_string())
        })?;

        let mut config = DeviceGrantConfig::new(issuer, client_id);
        if let Some(scope) = self.scope {
            config = config.with_scope(scope);
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.slow_down_increment_secs {
            config = config.with_slow_down_increment(Duration::from_secs(secs));
        }
        if let Some(attempts) = self.max_network_attempts {
            config = config.with_retry(RetryPolicy {
                max_attempts: attempts.max(1),
                ..RetryPolicy::default()
            });
        }
        if self.enforce_expiry.unwrap_or(false) {
            config = config.with_deadline(ExpiryDeadline::ProviderExpiry);
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    key: &str,
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<T>, DeviceGrantError> {
    get(key)
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                DeviceGrantError::Configuration(format!("{key} has invalid value '{raw}'"))
            })
        })
        .transpose()
}
