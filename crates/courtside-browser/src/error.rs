//! Browser error types - re-exports the unified CourtsideError from courtside-core
//!
//! Browser failures map onto these variants:
//! - Browser(String) - launch, CDP and DOM failures
//! - Navigation { url, reason } - page loads
//! - ElementNotFound { selector } - element lookups that timed out
//! - FrameNotFound(String) - payment frame resolution
//! - Screenshot(String) - captures
//!
//! Messages should name the element, frame or URL involved.

pub use courtside_core::{CourtsideError, Result};

pub type BrowserError = CourtsideError;
