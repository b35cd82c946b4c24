//! Screenshot capture into the output directory
//!
//! Files are named by what happened, not when:
//! `failed-<link-slug>.png`, `booked-<link-slug>.png`,
//! `reserved-<link-slug>.png` and `no-bookings.png`.

use courtside_core::fail_open::fail_open;
use courtside_core::{AttemptResult, CourtsideError, PageAutomation, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Longest slug kept from a link; long query strings are cut
const MAX_SLUG_CHARS: usize = 120;

/// `-` plus eight hex digits of the full link's hash
const SLUG_SUFFIX_CHARS: usize = 9;

/// Writes page screenshots under one directory
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the current page as `<name>.png`
    pub async fn capture(&self, page: &dyn PageAutomation, name: &str) -> Result<PathBuf> {
        let png = page.screenshot().await?;

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            CourtsideError::Screenshot(format!(
                "Failed to create screenshot directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.dir.join(format!("{}.png", name));
        fs::write(&path, &png).await.map_err(|e| {
            CourtsideError::Screenshot(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!("Screenshot saved: {} ({} bytes)", path.display(), png.len());
        Ok(path)
    }

    /// Screenshot of a page whose attempt failed
    ///
    /// This operation is fail-open - a missing screenshot never changes
    /// the attempt outcome
    pub async fn capture_failure(&self, page: &dyn PageAutomation, link: &str) -> Option<PathBuf> {
        let name = format!("failed-{}", slug(link));
        fail_open("screenshots::capture_failure", || self.capture(page, &name)).await
    }

    /// Screenshot of the winning page, named by the outcome
    ///
    /// This operation is fail-open
    pub async fn capture_success(
        &self,
        page: &dyn PageAutomation,
        result: AttemptResult,
        link: &str,
    ) -> Option<PathBuf> {
        let name = format!("{}-{}", result, slug(link));
        fail_open("screenshots::capture_success", || self.capture(page, &name)).await
    }

    /// Screenshot after every date and link was exhausted
    ///
    /// This operation is fail-open
    pub async fn capture_exhausted(&self, page: &dyn PageAutomation) -> Option<PathBuf> {
        fail_open("screenshots::capture_exhausted", || {
            self.capture(page, "no-bookings")
        })
        .await
    }
}

/// Filesystem-safe tag for a link: scheme dropped, runs of anything other
/// than ASCII alphanumerics collapsed to a single `-`.
///
/// Links too long to keep whole are cut and tagged with a hash of the full
/// link, so two links sharing a long prefix still get distinct files.
pub fn slug(link: &str) -> String {
    let without_scheme = link.split_once("://").map_or(link, |(_, rest)| rest);

    let mut out = String::with_capacity(without_scheme.len());
    for c in without_scheme.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    // only ASCII is pushed above, so byte slicing is safe
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        return "link".to_string();
    }
    if trimmed.len() <= MAX_SLUG_CHARS {
        return trimmed.to_string();
    }
    let prefix = trimmed[..MAX_SLUG_CHARS - SLUG_SUFFIX_CHARS].trim_end_matches('-');
    format!("{}-{:08x}", prefix, fnv1a(link.as_bytes()))
}

/// 32-bit FNV-1a, stable across runs and toolchains
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPage, PageScript};
    use tempfile::TempDir;

    #[test]
    fn test_slug() {
        assert_eq!(
            slug("https://www.nycgovparks.org/tennisreservation/reserve/123?d=2024-05-01"),
            "www-nycgovparks-org-tennisreservation-reserve-123-d-2024-05-01"
        );
        assert_eq!(slug("linkA"), "linka");
        assert_eq!(slug("https://"), "link");
        assert!(slug(&format!("https://a.test/{}", "x/".repeat(200))).len() <= MAX_SLUG_CHARS);
    }

    #[test]
    fn test_long_links_with_shared_prefix_stay_distinct() {
        let base = format!(
            "https://www.nycgovparks.org/tennisreservation/reserve/1001?{}",
            "session=abc&".repeat(20)
        );
        let first = slug(&format!("{}slot=1", base));
        let second = slug(&format!("{}slot=2", base));

        assert_ne!(first, second);
        assert!(first.len() <= MAX_SLUG_CHARS);
        assert!(second.len() <= MAX_SLUG_CHARS);
        assert!(first.starts_with("www-nycgovparks-org-tennisreservation-reserve-1001-session"));
        // same link, same file name
        assert_eq!(first, slug(&format!("{}slot=1", base)));
    }

    #[tokio::test]
    async fn test_failures_on_long_links_do_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScreenshotStore::new(temp_dir.path());
        let long = |n: u32| format!("https://a.test/{}?slot={}", "court/".repeat(30), n);
        let page = MockPage::new().with_page(&long(1), PageScript::new());
        page.navigate(&long(1)).await.unwrap();

        let first = store.capture_failure(&page, &long(1)).await.unwrap();
        let second = store.capture_failure(&page, &long(2)).await.unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_capture_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScreenshotStore::new(temp_dir.path().join("shots"));
        let page = MockPage::new().with_page("https://a.test/1", PageScript::new());
        page.navigate("https://a.test/1").await.unwrap();

        let path = store
            .capture_success(&page, AttemptResult::Booked, "https://a.test/1")
            .await
            .unwrap();

        assert_eq!(path, temp_dir.path().join("shots").join("booked-a-test-1.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_capture_failure_is_fail_open() {
        let temp_dir = TempDir::new().unwrap();
        // a regular file where the directory should be
        let blocked = temp_dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let store = ScreenshotStore::new(&blocked);
        let page = MockPage::new().with_page("https://a.test/1", PageScript::new());
        page.navigate("https://a.test/1").await.unwrap();

        assert!(store.capture_failure(&page, "https://a.test/1").await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScreenshotStore::new(temp_dir.path());
        let page = MockPage::new().with_page("https://a.test/", PageScript::new());
        page.navigate("https://a.test/").await.unwrap();

        let path = store.capture_exhausted(&page).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "no-bookings.png");
    }
}
