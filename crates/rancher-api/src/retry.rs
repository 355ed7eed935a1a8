//! Conflict retry for mutating calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default number of attempts for a mutating call.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Run `f` until it stops failing with 409, at most `attempts` times.
///
/// Any other outcome, success or error, is returned as-is. When every attempt
/// conflicts the last 409 comes back as [`Error::Conflict`]. The pause between
/// attempts is a timer await, so other tasks keep running.
pub async fn with_conflict_retry<F, Fut, T>(
    attempts: u32,
    delay: Duration,
    url: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Err(Error::Api(e)) if e.status == 409 => {
                if attempt >= attempts {
                    return Err(Error::Conflict {
                        attempts: attempt,
                        source: e,
                    });
                }
                tracing::warn!(
                    url,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
