//! Configuration management for courtside
//!
//! A single TOML file carries the operator's credentials, browser launch
//! settings, settle delays, payment frame addressing and output location.
//! Every section is optional; missing values fall back to the defaults
//! below, which match the booking site's observed behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::page::FrameRef;
use crate::{CourtsideError, Credentials, Result};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "courtside.toml";

/// Top-level courtside configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtsideConfig {
    /// How many times to try the initial page load before giving up
    #[serde(default = "default_initial_load_attempts")]
    pub initial_load_attempts: usize,

    /// Player and payment details; only rebook runs may omit them
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Settle periods between page interactions
    #[serde(default)]
    pub delays: SettleDelays,

    /// Where the card fields live
    #[serde(default)]
    pub payment: PaymentSettings,

    /// Screenshot and journal output
    #[serde(default)]
    pub output: OutputSettings,
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Upper bound on waiting for any single element to appear
    #[serde(default = "default_element_timeout_seconds")]
    pub element_timeout_seconds: u64,
}

/// Fixed pauses that let the site's asynchronous rendering finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleDelays {
    /// After the initial page load
    #[serde(default = "default_initial_load_ms")]
    pub initial_load_ms: u64,

    /// After opening a slot link, pressing a button or toggling player count
    #[serde(default = "default_short_ms")]
    pub short_ms: u64,

    /// After "Continue to Payment", before the payment frame is used
    #[serde(default = "default_payment_ms")]
    pub payment_ms: u64,

    /// Before the final success screenshot
    #[serde(default = "default_final_ms")]
    pub final_ms: u64,

    /// Base wait between initial load attempts, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Payment sub-frame addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// Zero-based iframe position, used when no name is configured
    #[serde(default = "default_frame_index")]
    pub frame_index: usize,

    /// `name` or `id` attribute of the payment iframe
    #[serde(default)]
    pub frame_name: Option<String>,
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

// Default value providers
fn default_initial_load_attempts() -> usize {
    1
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_user_agent() -> Option<String> {
    Some(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/60.0.3112.50 Safari/537.36"
            .to_string(),
    )
}

fn default_element_timeout_seconds() -> u64 {
    10
}

fn default_initial_load_ms() -> u64 {
    1000
}

fn default_short_ms() -> u64 {
    500
}

fn default_payment_ms() -> u64 {
    3000
}

fn default_final_ms() -> u64 {
    3000
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_frame_index() -> usize {
    3
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(".courtside/screenshots")
}

impl CourtsideConfig {
    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CourtsideError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Write the default configuration to `path`, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let config = Self {
            credentials: Some(Credentials::default()),
            ..Self::default()
        };
        let content = toml::to_string_pretty(&config).map_err(|e| {
            CourtsideError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Credentials, or a configuration error naming what needs them
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            CourtsideError::Config(
                "[credentials] section is required to fill player and payment details"
                    .to_string(),
            )
        })
    }
}

impl SettleDelays {
    /// No pauses at all, for scripted pages
    pub fn none() -> Self {
        Self {
            initial_load_ms: 0,
            short_ms: 0,
            payment_ms: 0,
            final_ms: 0,
            retry_backoff_ms: 0,
        }
    }

    pub fn initial_load(&self) -> Duration {
        Duration::from_millis(self.initial_load_ms)
    }

    pub fn short(&self) -> Duration {
        Duration::from_millis(self.short_ms)
    }

    pub fn payment(&self) -> Duration {
        Duration::from_millis(self.payment_ms)
    }

    pub fn final_capture(&self) -> Duration {
        Duration::from_millis(self.final_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl PaymentSettings {
    /// The frame reference to switch into for card entry
    pub fn frame(&self) -> FrameRef {
        match &self.frame_name {
            Some(name) => FrameRef::Name(name.clone()),
            None => FrameRef::Index(self.frame_index),
        }
    }
}

impl Default for CourtsideConfig {
    fn default() -> Self {
        Self {
            initial_load_attempts: default_initial_load_attempts(),
            credentials: None,
            browser: BrowserSettings::default(),
            delays: SettleDelays::default(),
            payment: PaymentSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            element_timeout_seconds: default_element_timeout_seconds(),
        }
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            initial_load_ms: default_initial_load_ms(),
            short_ms: default_short_ms(),
            payment_ms: default_payment_ms(),
            final_ms: default_final_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            frame_index: default_frame_index(),
            frame_name: None,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            screenshot_dir: default_screenshot_dir(),
        }
    }
}
