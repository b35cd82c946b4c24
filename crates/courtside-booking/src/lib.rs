//! # courtside-booking
//!
//! Search-and-book engine for courtside.
//!
//! This crate provides:
//! - Venue window resolution and target construction
//! - Slot discovery on the availability results page
//! - The two-stage reservation form pipeline
//! - A pure per-link attempt state machine and its executor
//! - The run orchestrator with date and link fallback
//! - Screenshot capture and the markdown run journal
//! - [`mock::MockPage`], a scripted page for driving all of the above in tests

mod attempt;
mod form;
mod journal;
pub mod mock;
mod orchestrator;
mod screenshots;
pub mod selectors;
mod slots;
mod state_machine;
mod target;
mod venue;

pub use attempt::{AttemptError, BookingAttempt};
pub use form::{
    identification_for, ExistingPermitIdentification, IdentificationFiller,
    PermitNumberIdentification, ReservationFormPipeline,
};
pub use journal::{RunJournal, JOURNAL_FILE};
pub use orchestrator::{BookingOrchestrator, NO_BOOKINGS};
pub use screenshots::{slug, ScreenshotStore};
pub use slots::SlotFinder;
pub use state_machine::{transition, Action, AttemptPlan, Event, Settle, State};
pub use target::{
    is_rebook_link, parse_date, window_date, BookingTarget, ResolvedTarget, TargetRequest,
    DATE_FORMAT, REBOOK_MARKERS,
};
pub use venue::{venue_id_from_link, VenueWindowResolver};
