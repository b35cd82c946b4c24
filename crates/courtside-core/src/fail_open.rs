//! Side work that must never end a booking run
//!
//! Screenshots and journal entries are evidence of what happened. Losing one
//! is logged and the run carries on.
//!
//! Not for form filling, button presses or results page lookups: attempt
//! outcomes and date fallback depend on those errors. Steps the run cannot
//! continue without belong in [`crate::retry`].

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Await `f`, logging a failure as a warning and yielding `None` in its place
///
/// ```no_run
/// use courtside_core::fail_open::fail_open;
/// use courtside_core::Result;
///
/// async fn append_journal() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     // None if the journal could not be written
///     let written = fail_open("journal::log_date", || append_journal()).await;
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (continuing): {}", operation_name, e);
            None
        }
    }
}
