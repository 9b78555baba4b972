//! Terminal presenter: prints instructions and launches the system browser.

use crate::auth::{DeviceAuthorization, UserPresenter};

/// Writes instructions to stderr so stdout stays reserved for token output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter;

impl UserPresenter for TerminalPresenter {
    fn present(&self, authorization: &DeviceAuthorization) {
        eprintln!("🔗 Visit: {}", authorization.verification_uri);
        eprintln!("📋 Enter code: {}", authorization.user_code);
        eprintln!("⏳ Waiting for authorization...");
    }

    fn open_uri(&self, uri: &str) -> Result<(), String> {
        opener::open(uri).map_err(|e| e.to_string())
    }
}
