//! Bounded retries for steps a run cannot continue without
//!
//! Unlike [`crate::fail_open`], exhausting the attempts is an error and is
//! logged as one.

use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::Result;

/// Run `f` up to `attempts` times (at least once), sleeping `backoff * n`
/// after the n-th failure. Returns the last error when every attempt fails.
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &str,
    attempts: usize,
    backoff: Duration,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt >= attempts => {
                error!(
                    "{} failed after {} attempt(s): {}",
                    operation_name, attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name, attempt, attempts, e
                );
                tokio::time::sleep(backoff * attempt as u32).await;
                attempt += 1;
            }
        }
    }
}
