use std::fmt;

use serde::{Deserialize, Serialize};

/// Token set returned by the token endpoint once the user has authorized.
///
/// `id_token` is only present when `openid` was granted, `refresh_token`
/// only when `offline_access` was granted.
///
/// # Example
/// ```
/// use device_grant::auth::TokenResult;
///
/// let token: TokenResult = serde_json::from_str(r#"{
///     "access_token": "at",
///     "token_type": "Bearer",
///     "expires_in": 3600,
///     "scope": "openid profile"
/// }"#).unwrap();
/// assert_eq!(token.scopes().collect::<Vec<_>>(), ["openid", "profile"]);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl TokenResult {
    /// Iterate the granted scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }
}

impl fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &"..")
            .field("id_token", &self.id_token.as_ref().map(|_| ".."))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| ".."))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}
