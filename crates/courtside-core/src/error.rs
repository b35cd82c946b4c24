//! Unified error types for courtside

use thiserror::Error;

/// Unified error type for all courtside operations
#[derive(Error, Debug)]
pub enum CourtsideError {
    // Venue errors
    #[error("Unknown venue id: {0}")]
    UnknownVenue(u32),

    #[error("Cannot derive venue id from link: {0}")]
    InvalidVenueLink(String),

    // Results page errors
    #[error("No results table for date {0}")]
    NoSuchDate(String),

    #[error("No row matching '{time}' in results table for {date}")]
    NoSuchTimeRow { date: String, time: String },

    // Booking page errors
    #[error("Form field not found: {0}")]
    FormFieldNotFound(String),

    #[error("Control not found: {0}")]
    ControlNotFound(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    // Driver errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl CourtsideError {
    /// Errors that only rule out the current date, not the whole run
    pub fn is_recoverable_for_date(&self) -> bool {
        matches!(self, Self::NoSuchDate(_) | Self::NoSuchTimeRow { .. })
    }
}

/// Result type alias using CourtsideError
pub type Result<T> = std::result::Result<T, CourtsideError>;
