//! Run-level control loop: dates, then candidate links, first success wins

use courtside_core::retry::retry_with_backoff;
use courtside_core::{
    AttemptOutcome, CourtsideError, Credentials, FrameRef, PageAutomation, Result, SettleDelays,
    SlotCandidate, Venue,
};
use tracing::{info, warn};

use crate::attempt::BookingAttempt;
use crate::form::ReservationFormPipeline;
use crate::journal::RunJournal;
use crate::screenshots::ScreenshotStore;
use crate::slots::SlotFinder;
use crate::target::BookingTarget;

/// Error recorded on the outcome of a run that booked nothing
pub const NO_BOOKINGS: &str = "no bookings made";

/// The main orchestrator struct
pub struct BookingOrchestrator<'a> {
    page: &'a dyn PageAutomation,
    venue: Venue,
    credentials: Option<&'a Credentials>,
    payment_frame: FrameRef,
    delays: SettleDelays,
    screenshots: ScreenshotStore,
    journal: RunJournal,
}

impl<'a> BookingOrchestrator<'a> {
    pub fn new(
        page: &'a dyn PageAutomation,
        venue: Venue,
        screenshots: ScreenshotStore,
        journal: RunJournal,
    ) -> Self {
        Self {
            page,
            venue,
            credentials: None,
            payment_frame: FrameRef::Index(3),
            delays: SettleDelays::default(),
            screenshots,
            journal,
        }
    }

    /// Needed for every run outside rebook mode
    pub fn with_credentials(mut self, credentials: &'a Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_payment_frame(mut self, frame: FrameRef) -> Self {
        self.payment_frame = frame;
        self
    }

    pub fn with_delays(mut self, delays: SettleDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Load the results page, retrying up to `attempts` times
    ///
    /// A failure here is fatal to the run.
    pub async fn load_results(&self, link: &str, attempts: usize) -> Result<()> {
        retry_with_backoff(
            "initial_load",
            attempts,
            self.delays.retry_backoff(),
            || self.page.navigate(link),
        )
        .await
        .map_err(|e| {
            let last = match e {
                CourtsideError::Navigation { reason, .. } => reason,
                other => other.to_string(),
            };
            CourtsideError::Navigation {
                url: link.to_string(),
                reason: format!("{} (after {} attempt(s))", last, attempts.max(1)),
            }
        })?;
        tokio::time::sleep(self.delays.initial_load()).await;
        Ok(())
    }

    /// Search every date in order and attempt every candidate link in order
    ///
    /// Expects the results page for `target.link` to be loaded (see
    /// [`BookingOrchestrator::load_results`]). Stops at the first
    /// `Booked` or `ReservedUnconfirmed` outcome. Date and link failures
    /// are logged and skipped; exhausting everything yields a `Failed`
    /// outcome carrying [`NO_BOOKINGS`].
    pub async fn run(&self, target: &BookingTarget, rebook: bool, book: bool) -> AttemptOutcome {
        if rebook {
            info!("Rebook mode on");
        }
        info!(
            "Searching for courts on {} at {}",
            target.dates.join(", "),
            target.time_label
        );
        self.journal.log_run_start(target, rebook, book).await;

        let attempt = self.attempt(rebook, book);
        // attempts navigate away from the results page
        let mut on_results = true;

        for date in &target.dates {
            info!("Trying {}", date);
            let candidates = match self.search(target, date, &mut on_results).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    if e.is_recoverable_for_date() {
                        info!("Unable to find available courts: {}", e);
                    } else {
                        warn!("Unable to find available courts on {}: {}", date, e);
                    }
                    self.journal.log_date(date, Err(e.to_string())).await;
                    continue;
                }
            };
            self.journal.log_date(date, Ok(candidates.len())).await;

            if candidates.is_empty() {
                info!("No courts found.");
                continue;
            }
            info!("Found {} courts", candidates.len());

            on_results = false;
            for candidate in &candidates {
                match attempt.run(&candidate.link).await {
                    Ok(outcome) => {
                        self.journal.log_attempt(&outcome).await;
                        self.finish(&outcome).await;
                        return outcome;
                    }
                    Err(err) => {
                        warn!("{}", err);
                        self.journal.log_attempt(&err.to_outcome()).await;
                    }
                }
            }
        }

        info!("No bookings made");
        let outcome = AttemptOutcome::failed(&target.link, NO_BOOKINGS);
        self.screenshots.capture_exhausted(self.page).await;
        self.journal.log_run_complete(&outcome).await;
        outcome
    }

    /// Slot candidates for one date, reloading the results page if an
    /// earlier attempt left it
    async fn search(
        &self,
        target: &BookingTarget,
        date: &str,
        on_results: &mut bool,
    ) -> Result<Vec<SlotCandidate>> {
        if !*on_results {
            self.page.navigate(&target.link).await?;
            tokio::time::sleep(self.delays.initial_load()).await;
            *on_results = true;
        }
        SlotFinder::new(self.page)
            .find(date, &target.time_label)
            .await
    }

    fn attempt(&self, rebook: bool, book: bool) -> BookingAttempt<'_> {
        let attempt = BookingAttempt::new(
            self.page,
            &self.screenshots,
            self.delays.clone(),
            rebook,
            book,
        );
        match self.credentials {
            Some(credentials) => attempt.with_forms(ReservationFormPipeline::new(
                self.page,
                credentials,
                self.venue.form_variant,
                self.payment_frame.clone(),
                self.delays.clone(),
            )),
            None => attempt,
        }
    }

    async fn finish(&self, outcome: &AttemptOutcome) {
        tokio::time::sleep(self.delays.final_capture()).await;
        self.screenshots
            .capture_success(self.page, outcome.result, &outcome.link)
            .await;
        self.journal.log_run_complete(outcome).await;
        info!("Done");
    }
}
