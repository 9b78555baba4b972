//! User-facing side of the flow: showing the code and opening a browser.

use std::sync::Mutex;

use super::device_code::DeviceAuthorization;

/// Output sink the flow hands the verification URI and user code to.
///
/// The flow never depends on the outcome: a failure to open a browser is
/// logged and polling continues.
pub trait UserPresenter: Send + Sync {
    /// Show the verification URI and user code.
    fn present(&self, authorization: &DeviceAuthorization);

    /// Open `uri` in a browser.
    fn open_uri(&self, uri: &str) -> Result<(), String>;
}

/// Presenter that records what it was asked to do.
///
/// Useful for headless callers that surface the code through their own UI.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    presented: Mutex<Vec<(String, String)>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(verification_uri, user_code)` pairs presented so far.
    pub fn presented(&self) -> Vec<(String, String)> {
        self.presented
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// URIs the flow asked to open.
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl UserPresenter for RecordingPresenter {
    fn present(&self, authorization: &DeviceAuthorization) {
        if let Ok(mut guard) = self.presented.lock() {
            guard.push((
                authorization.verification_uri.clone(),
                authorization.user_code.clone(),
            ));
        }
    }

    fn open_uri(&self, uri: &str) -> Result<(), String> {
        if let Ok(mut guard) = self.opened.lock() {
            guard.push(uri.to_string());
        }
        Ok(())
    }
}
