//! Core type definitions for court reservations

use serde::{Deserialize, Serialize};

/// Which player-identification fields a venue's booking form expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
    /// Permit number plus the `name1` field
    CentralPark,
    /// "Existing permit" toggle plus the generic `name` field
    General,
}

impl std::fmt::Display for FormVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CentralPark => write!(f, "central_park"),
            Self::General => write!(f, "general"),
        }
    }
}

/// A court-booking endpoint with its default lead-time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Venue {
    pub id: u32,
    pub name: &'static str,
    pub window_days: u32,
    pub form_variant: FormVariant,
}

impl Venue {
    pub const CENTRAL_PARK: Venue = Venue {
        id: 12,
        name: "Central Park",
        window_days: 30,
        form_variant: FormVariant::CentralPark,
    };

    pub const MCCARREN_PARK: Venue = Venue {
        id: 11,
        name: "McCarren Park",
        window_days: 7,
        form_variant: FormVariant::General,
    };

    /// Every venue profile the tool knows how to book
    pub const KNOWN: [Venue; 2] = [Venue::CENTRAL_PARK, Venue::MCCARREN_PARK];
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// Personal and payment details typed into the booking forms
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone: String,
    pub permit_number: String,
    pub cc_number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub csc: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("zip_code", &self.zip_code)
            .field("phone", &self.phone)
            .field("permit_number", &self.permit_number)
            .field("cc_number", &"<redacted>")
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("csc", &"<redacted>")
            .finish()
    }
}

/// A bookable slot discovered on a results page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotCandidate {
    pub link: String,
}

impl SlotCandidate {
    pub fn new(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }
}

/// Terminal classification of one booking attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    /// The final submit control was pressed
    Booked,
    /// Everything up to the final submit ran, but the run is a dry-run
    ReservedUnconfirmed,
    Failed,
}

impl AttemptResult {
    /// Both booked and dry-run reservations end the search
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Booked | Self::ReservedUnconfirmed)
    }
}

impl std::fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booked => write!(f, "booked"),
            Self::ReservedUnconfirmed => write!(f, "reserved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of attempting one candidate link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub link: String,
    pub result: AttemptResult,
    pub error: Option<String>,
}

impl AttemptOutcome {
    pub fn booked(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            result: AttemptResult::Booked,
            error: None,
        }
    }

    pub fn reserved_unconfirmed(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            result: AttemptResult::ReservedUnconfirmed,
            error: None,
        }
    }

    pub fn failed(link: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            result: AttemptResult::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Buttons on the booking pages, identified by their visible label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    ConfirmPlayerDetails,
    ContinueToPayment,
    PayNow,
    MakeReservation,
}

impl Button {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConfirmPlayerDetails => "Confirm and Enter Player Details",
            Self::ContinueToPayment => "Continue to Payment",
            Self::PayNow => "Pay Now",
            Self::MakeReservation => "Make Reservation",
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
