//! Executes the attempt state machine against a live page

use courtside_core::{AttemptOutcome, CourtsideError, PageAutomation, Result, SettleDelays};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::form::ReservationFormPipeline;
use crate::screenshots::ScreenshotStore;
use crate::selectors;
use crate::state_machine::{transition, Action, AttemptPlan, Event, Settle, State};

/// A failed attempt on one slot link
///
/// Never fatal to a run: the orchestrator logs it and moves to the next
/// candidate.
#[derive(Debug, Error)]
#[error("Error booking {link}: {source}")]
pub struct AttemptError {
    pub link: String,
    #[source]
    pub source: CourtsideError,
    /// Failure screenshot, when one could be written
    pub screenshot: Option<PathBuf>,
}

impl AttemptError {
    pub fn to_outcome(&self) -> AttemptOutcome {
        AttemptOutcome::failed(&self.link, self.source.to_string())
    }
}

/// Drives one slot link from navigation to an outcome
pub struct BookingAttempt<'a> {
    page: &'a dyn PageAutomation,
    forms: Option<ReservationFormPipeline<'a>>,
    screenshots: &'a ScreenshotStore,
    delays: SettleDelays,
    rebook: bool,
    book: bool,
}

impl<'a> BookingAttempt<'a> {
    /// Attempt without a form pipeline, which is enough for rebooking
    pub fn new(
        page: &'a dyn PageAutomation,
        screenshots: &'a ScreenshotStore,
        delays: SettleDelays,
        rebook: bool,
        book: bool,
    ) -> Self {
        Self {
            page,
            forms: None,
            screenshots,
            delays,
            rebook,
            book,
        }
    }

    pub fn with_forms(mut self, forms: ReservationFormPipeline<'a>) -> Self {
        self.forms = Some(forms);
        self
    }

    /// Run the attempt to a terminal state
    ///
    /// Ok carries `Booked` or `ReservedUnconfirmed`. Any navigation, field
    /// or control failure ends the attempt with a failure screenshot.
    pub async fn run(&self, link: &str) -> std::result::Result<AttemptOutcome, AttemptError> {
        let plan = AttemptPlan {
            link: link.to_string(),
            rebook: self.rebook,
            book: self.book,
        };
        let mut state = State::Start;

        loop {
            match state {
                State::Booked => return Ok(AttemptOutcome::booked(link)),
                State::ReservedUnconfirmed => return Ok(AttemptOutcome::reserved_unconfirmed(link)),
                State::Failed { error } => {
                    return Err(AttemptError {
                        link: link.to_string(),
                        source: CourtsideError::Other(error),
                        screenshot: None,
                    })
                }
                _ => {}
            }

            let (next, actions) = transition(state.clone(), Event::Proceed, &plan);
            debug!("{:?} -> {:?}", state, next);

            if let Err(source) = self.execute_all(&actions).await {
                let (_, actions) = transition(
                    state,
                    Event::Error {
                        message: source.to_string(),
                    },
                    &plan,
                );
                let screenshot = self.execute_failure(&actions).await;
                return Err(AttemptError {
                    link: link.to_string(),
                    source,
                    screenshot,
                });
            }
            state = next;
        }
    }

    async fn execute_all(&self, actions: &[Action]) -> Result<()> {
        for action in actions {
            self.execute(action).await?;
        }
        Ok(())
    }

    async fn execute(&self, action: &Action) -> Result<()> {
        match action {
            Action::LogActivity { message } => {
                info!("{}", message);
            }
            Action::Navigate { link } => {
                self.page.navigate(link).await?;
            }
            Action::Settle(Settle::Short) => tokio::time::sleep(self.delays.short()).await,
            Action::Settle(Settle::Payment) => tokio::time::sleep(self.delays.payment()).await,
            Action::Press(button) => {
                debug!("Pressing '{}'", button);
                self.page
                    .click(&selectors::button(*button))
                    .await
                    .map_err(|e| match e {
                        CourtsideError::ElementNotFound { .. } => {
                            CourtsideError::ControlNotFound(button.label().to_string())
                        }
                        other => other,
                    })?;
            }
            Action::FillPlayerDetails => self.forms()?.fill_player_details().await?,
            Action::FillPaymentDetails => self.forms()?.fill_payment_details().await?,
            Action::CaptureFailureScreenshot { link } => {
                self.screenshots.capture_failure(self.page, link).await;
            }
        }
        Ok(())
    }

    /// Failure actions are best effort; returns the screenshot path
    async fn execute_failure(&self, actions: &[Action]) -> Option<PathBuf> {
        let mut screenshot = None;
        for action in actions {
            match action {
                Action::LogActivity { message } => warn!("{}", message),
                Action::CaptureFailureScreenshot { link } => {
                    screenshot = self.screenshots.capture_failure(self.page, link).await;
                }
                other => {
                    if let Err(e) = self.execute(other).await {
                        warn!("Failure action {:?} failed: {}", other, e);
                    }
                }
            }
        }
        screenshot
    }

    fn forms(&self) -> Result<&ReservationFormPipeline<'a>> {
        self.forms.as_ref().ok_or_else(|| {
            CourtsideError::Config("Player and payment details need [credentials]".to_string())
        })
    }
}
