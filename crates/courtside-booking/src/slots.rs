//! Available-slot discovery on the results page

use courtside_core::{CourtsideError, PageAutomation, Result, SlotCandidate};
use tracing::debug;

use crate::selectors;

/// Reads the already-loaded results page for bookable slots
pub struct SlotFinder<'a> {
    page: &'a dyn PageAutomation,
}

impl<'a> SlotFinder<'a> {
    pub fn new(page: &'a dyn PageAutomation) -> Self {
        Self { page }
    }

    /// Available slots in the first row of `date`'s table whose label
    /// contains `time_label`
    ///
    /// # Errors
    /// - `NoSuchDate` when the page has no table for `date`
    /// - `NoSuchTimeRow` when no row label contains `time_label`
    ///
    /// A matching row without available cells yields an empty list.
    pub async fn find(&self, date: &str, time_label: &str) -> Result<Vec<SlotCandidate>> {
        if !self.page.exists(&selectors::date_table(date)).await? {
            return Err(CourtsideError::NoSuchDate(date.to_string()));
        }

        let labels = self
            .page
            .text_contents(&selectors::time_row_labels(date))
            .await?;
        let row_index = labels
            .iter()
            .position(|label| label.contains(time_label))
            .ok_or_else(|| CourtsideError::NoSuchTimeRow {
                date: date.to_string(),
                time: time_label.to_string(),
            })?;
        debug!("'{}' matched row {} of {}", time_label, row_index, date);

        let links = self
            .page
            .link_targets(&selectors::available_slot_links(date, row_index))
            .await?;

        Ok(links.into_iter().map(SlotCandidate::new).collect())
    }
}
