//! Page automation capability consumed by the booking engine
//!
//! The booking engine never owns a browser. It drives whatever implements
//! [`PageAutomation`]: the Chrome DevTools session in `courtside-browser`
//! in production, scripted fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// How to find an element on the current page (or frame)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Match on the element's `id` attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Css(selector) => write!(f, "css:{}", selector),
            Self::XPath(expr) => write!(f, "xpath:{}", expr),
        }
    }
}

/// Reference to a sub-frame of the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRef {
    /// Zero-based position among the page's iframes
    Index(usize),
    /// Frame whose `name` or `id` attribute matches
    Name(String),
}

impl std::fmt::Display for FrameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "frame[{}]", index),
            Self::Name(name) => write!(f, "frame '{}'", name),
        }
    }
}

/// Primitive page interactions
///
/// Element operations apply to the active frame, which is the top-level
/// document until [`PageAutomation::switch_to_frame`] is called and again
/// after every [`PageAutomation::navigate`].
#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Load a URL and wait for the navigation to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the loaded page
    async fn current_url(&self) -> Result<String>;

    /// Whether at least one element matches
    async fn exists(&self, locator: &Locator) -> Result<bool>;

    /// Absolute `href` targets of every anchor the locator matches, in
    /// document order. Empty when nothing matches.
    async fn link_targets(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Rendered text of every element the locator matches, in document
    /// order. Empty when nothing matches.
    async fn text_contents(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Click the first matching element
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Type text into the first matching element
    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Scope subsequent element operations to a sub-frame
    async fn switch_to_frame(&self, frame: &FrameRef) -> Result<()>;

    /// Scope element operations back to the top-level document
    async fn switch_to_main(&self) -> Result<()>;

    /// PNG capture of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
