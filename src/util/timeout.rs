//! Deadline helper.

use std::future::Future;
use std::time::Duration;

use crate::error::DeviceGrantError;

/// Wrap a future with a deadline, failing with
/// [`DeviceGrantError::DeadlineExceeded`] when it elapses first.
pub async fn with_deadline<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, DeviceGrantError>>,
) -> Result<T, DeviceGrantError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(DeviceGrantError::DeadlineExceeded {
            after_secs: duration.as_secs(),
        }),
    }
}
