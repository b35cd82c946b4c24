//! Run journal - human-readable record of a run in `journal.md`
//!
//! One section per run, appended to the output directory's journal:
//! - Run start with target, dates and mode
//! - Each date searched and how many courts were found
//! - Each attempt outcome
//! - The final outcome

use chrono::Local;
use courtside_core::fail_open::fail_open;
use courtside_core::{AttemptOutcome, AttemptResult, Result};
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::target::BookingTarget;

/// Journal file name inside the output directory
pub const JOURNAL_FILE: &str = "journal.md";

/// Append-only markdown journal of booking runs
#[derive(Debug, Clone)]
pub struct RunJournal {
    output_path: PathBuf,
}

impl RunJournal {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_path: output_dir.join(JOURNAL_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Log the start of a run
    ///
    /// This operation is fail-open - journal failures won't stop the run
    pub async fn log_run_start(&self, target: &BookingTarget, rebook: bool, book: bool) {
        fail_open("journal::log_run_start", || async {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let mode = match (rebook, book) {
                (true, true) => "rebook",
                (true, false) => "rebook (dry run)",
                (false, true) => "book",
                (false, false) => "dry run",
            };

            let content = format!(
                "## Run {}\n\n**Link**: {}\n**Time**: {}\n**Dates**: {}\n**Mode**: {}\n\n",
                timestamp,
                target.link,
                target.time_label,
                target.dates.join(", "),
                mode
            );

            self.append_internal(&content).await
        })
        .await;
    }

    /// Log the result of searching one date
    ///
    /// This operation is fail-open
    pub async fn log_date(&self, date: &str, found: std::result::Result<usize, String>) {
        fail_open("journal::log_date", || async {
            let content = match found {
                Ok(count) => format!("### {}\nFound {} courts\n\n", date, count),
                Err(reason) => format!("### {}\nSkipped: {}\n\n", date, reason),
            };
            self.append_internal(&content).await
        })
        .await;
    }

    /// Log one attempt outcome
    ///
    /// This operation is fail-open
    pub async fn log_attempt(&self, outcome: &AttemptOutcome) {
        fail_open("journal::log_attempt", || async {
            let mut content = format!("- {} **{}**", outcome.link, outcome.result);
            if let Some(error) = &outcome.error {
                content.push_str(&format!(": {}", error.replace('\n', " ")));
            }
            content.push('\n');
            self.append_internal(&content).await
        })
        .await;
    }

    /// Log the final outcome of the run
    ///
    /// This operation is fail-open
    pub async fn log_run_complete(&self, outcome: &AttemptOutcome) {
        fail_open("journal::log_run_complete", || async {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let icon = if outcome.is_success() { "✓" } else { "✗" };
            let summary = match outcome.result {
                AttemptResult::Booked => format!("Booked {}", outcome.link),
                AttemptResult::ReservedUnconfirmed => {
                    format!("Reserved {} (not confirmed)", outcome.link)
                }
                AttemptResult::Failed => outcome
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed".to_string()),
            };

            let content = format!(
                "\n**Finished**: {}\n**Outcome**: {} {}\n\n---\n\n",
                timestamp, icon, summary
            );
            self.append_internal(&content).await
        })
        .await;
    }

    /// Append content to the journal (internal, returns Result for fail_open)
    async fn append_internal(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await?;

        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn target() -> BookingTarget {
        BookingTarget {
            link: "https://www.nycgovparks.org/tennisreservation/availability/12".to_string(),
            time_label: "12:00 p.m.".to_string(),
            dates: vec!["2024-05-01".to_string(), "2024-05-02".to_string()],
        }
    }

    #[tokio::test]
    async fn test_run_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let journal = RunJournal::new(temp_dir.path().join("out"));

        journal.log_run_start(&target(), false, false).await;
        journal.log_date("2024-05-01", Ok(2)).await;
        journal
            .log_attempt(&AttemptOutcome::failed("https://a.test/A", "Form field not found: email"))
            .await;
        journal
            .log_attempt(&AttemptOutcome::reserved_unconfirmed("https://a.test/B"))
            .await;
        journal
            .log_run_complete(&AttemptOutcome::reserved_unconfirmed("https://a.test/B"))
            .await;

        let content = fs::read_to_string(journal.path()).await.unwrap();
        assert!(content.contains("**Dates**: 2024-05-01, 2024-05-02"));
        assert!(content.contains("**Mode**: dry run"));
        assert!(content.contains("Found 2 courts"));
        assert!(content.contains("- https://a.test/A **failed**: Form field not found: email"));
        assert!(content.contains("- https://a.test/B **reserved**"));
        assert!(content.contains("✓ Reserved https://a.test/B (not confirmed)"));
    }

    #[tokio::test]
    async fn test_runs_append() {
        let temp_dir = TempDir::new().unwrap();
        let journal = RunJournal::new(temp_dir.path().to_path_buf());

        journal.log_run_start(&target(), true, true).await;
        journal
            .log_date("2024-05-01", Err("No results table for date 2024-05-01".to_string()))
            .await;
        journal
            .log_run_complete(&AttemptOutcome::failed("", "no bookings made"))
            .await;
        journal.log_run_start(&target(), false, true).await;

        let content = fs::read_to_string(journal.path()).await.unwrap();
        assert_eq!(content.matches("## Run ").count(), 2);
        assert!(content.contains("Skipped: No results table for date 2024-05-01"));
        assert!(content.contains("✗ no bookings made"));
        assert!(content.contains("**Mode**: rebook\n"));
    }

    #[tokio::test]
    async fn test_unwritable_journal_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let blocked = temp_dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let journal = RunJournal::new(blocked);

        // Must not panic or error
        journal.log_run_start(&target(), false, false).await;
        assert!(!journal.path().exists());
    }
}
