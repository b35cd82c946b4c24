//! Chrome DevTools page automation for courtside
//!
//! [`BrowserSession`] launches a Chrome/Chromium instance through the Chrome
//! DevTools Protocol and implements [`courtside_core::PageAutomation`] on
//! its single tab. The booking engine drives it through that trait only.
//!
//! # Example
//!
//! ```no_run
//! use courtside_browser::{BrowserConfig, BrowserSession};
//! use courtside_core::{Locator, PageAutomation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = BrowserSession::launch_with_config(BrowserConfig::default()).await?;
//!     session
//!         .navigate("https://www.nycgovparks.org/tennisreservation/availability/12")
//!         .await?;
//!     let has_table = session.exists(&Locator::id("2024-05-01")).await?;
//!     println!("table present: {}", has_table);
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium installed
//! - Payment iframes are reached through a pierced DOM snapshot, so the
//!   browser is launched with site isolation disabled

pub mod browser;
pub mod error;
mod frame;

pub use browser::{BrowserConfig, BrowserSession};
pub use error::{BrowserError, Result};
