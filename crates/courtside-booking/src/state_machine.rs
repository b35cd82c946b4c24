//! Pure state machine for a single booking attempt
//!
//! This module has NO I/O. `transition(state, event, plan)` returns the
//! next state and the actions the caller must perform to get there.
//!
//! Key design principles:
//! - Deterministic: the same inputs always give the same outputs
//! - Errors move any non-terminal state to Failed
//! - Invalid transitions go to Failed state (never panic)

use courtside_core::{AttemptOutcome, Button};

/// Per-attempt mode, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    /// Slot link being attempted
    pub link: String,
    /// Rebooking flow: no player or payment details
    pub rebook: bool,
    /// Press the final submit control (otherwise dry-run)
    pub book: bool,
}

/// Booking attempt state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Nothing done yet
    Start,
    /// Slot page loaded
    Navigated,
    /// Rebooking flow: the page only needs the final confirmation
    RebookShortcut,
    /// Player-details form filled
    PlayerDetailsFilled,
    /// Payment form filled
    PaymentFilled,
    /// Final step reached (final control pressed unless dry-run)
    Submitted,
    /// Reservation confirmed
    Booked,
    /// Dry-run stopped right before the final control
    ReservedUnconfirmed,
    /// Attempt abandoned
    Failed { error: String },
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            State::Booked | State::ReservedUnconfirmed | State::Failed { .. }
        )
    }

    /// Outcome for a terminal state, None while the attempt is in progress
    pub fn outcome(&self, link: &str) -> Option<AttemptOutcome> {
        match self {
            State::Booked => Some(AttemptOutcome::booked(link)),
            State::ReservedUnconfirmed => Some(AttemptOutcome::reserved_unconfirmed(link)),
            State::Failed { error } => Some(AttemptOutcome::failed(link, error.clone())),
            _ => None,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The actions of the previous transition all succeeded
    Proceed,
    /// An action failed
    Error { message: String },
}

/// Which settle period to wait out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// After loading a slot page or pressing a button
    Short,
    /// After "Continue to Payment", while the payment frame loads
    Payment,
}

/// Actions to execute as side effects of transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load the slot page
    Navigate { link: String },
    /// Wait out a settle period
    Settle(Settle),
    /// Press a labelled control
    Press(Button),
    /// Run stage A of the form pipeline
    FillPlayerDetails,
    /// Run stage B of the form pipeline
    FillPaymentDetails,
    /// Screenshot the failing page, tagged with the link
    CaptureFailureScreenshot { link: String },
    /// Log activity
    LogActivity { message: String },
}

/// Pure state transition function
///
/// Takes current state, event and the attempt plan; returns the new state
/// and the actions to execute. This function never panics.
pub fn transition(state: State, event: Event, plan: &AttemptPlan) -> (State, Vec<Action>) {
    match (state, event) {
        (State::Start, Event::Proceed) => (
            State::Navigated,
            vec![
                Action::LogActivity {
                    message: format!("Trying {}", plan.link),
                },
                Action::Navigate {
                    link: plan.link.clone(),
                },
                Action::Settle(Settle::Short),
            ],
        ),

        (State::Navigated, Event::Proceed) if plan.rebook => (
            State::RebookShortcut,
            vec![Action::LogActivity {
                message: "Rebook page, skipping player details".to_string(),
            }],
        ),

        (State::Navigated, Event::Proceed) => (
            State::PlayerDetailsFilled,
            vec![
                Action::Press(Button::ConfirmPlayerDetails),
                Action::Settle(Settle::Short),
                Action::FillPlayerDetails,
            ],
        ),

        (State::RebookShortcut, Event::Proceed) => (
            State::Submitted,
            final_press(plan, Button::MakeReservation),
        ),

        (State::PlayerDetailsFilled, Event::Proceed) => (
            State::PaymentFilled,
            vec![
                Action::Press(Button::ContinueToPayment),
                Action::Settle(Settle::Short),
                Action::Settle(Settle::Payment),
                Action::FillPaymentDetails,
            ],
        ),

        (State::PaymentFilled, Event::Proceed) => {
            (State::Submitted, final_press(plan, Button::PayNow))
        }

        (State::Submitted, Event::Proceed) if plan.book => (
            State::Booked,
            vec![Action::LogActivity {
                message: "Successfully booked".to_string(),
            }],
        ),

        (State::Submitted, Event::Proceed) => (
            State::ReservedUnconfirmed,
            vec![Action::LogActivity {
                message: "Dry run: reservation left unconfirmed".to_string(),
            }],
        ),

        // Error events from any non-terminal state
        (state, Event::Error { message }) if !state.is_terminal() => (
            State::Failed {
                error: message.clone(),
            },
            vec![
                Action::LogActivity {
                    message: format!("Error booking {}: {}", plan.link, message),
                },
                Action::CaptureFailureScreenshot {
                    link: plan.link.clone(),
                },
            ],
        ),

        // Terminal states - no valid transitions
        (state, event) => (
            State::Failed {
                error: format!(
                    "Invalid transition from terminal state {:?} on event: {:?}",
                    state, event
                ),
            },
            vec![],
        ),
    }
}

/// Press the final control only when actually booking
fn final_press(plan: &AttemptPlan, button: Button) -> Vec<Action> {
    if plan.book {
        vec![Action::Press(button), Action::Settle(Settle::Short)]
    } else {
        vec![Action::LogActivity {
            message: format!("Dry run: not pressing '{}'", button),
        }]
    }
}
