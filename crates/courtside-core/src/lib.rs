//! # courtside-core
//!
//! Core types for courtside, a single-operator tennis court reservation tool.
//!
//! ## Contents
//!
//! - Venue profiles, credentials and attempt outcomes
//! - The unified [`CourtsideError`] type
//! - TOML configuration ([`config::CourtsideConfig`])
//! - The [`page::PageAutomation`] capability the booking engine drives
//! - Fail-open helpers for side work that must never abort a run
//! - Bounded retries for steps a run cannot continue without

pub mod config;
mod error;
pub mod fail_open;
pub mod page;
pub mod retry;
mod types;

pub use config::{CourtsideConfig, SettleDelays};
pub use error::{CourtsideError, Result};
pub use page::{FrameRef, Locator, PageAutomation};
pub use types::*;
