//! Booking target construction from run options

use chrono::{Days, NaiveDate};
use courtside_core::{CourtsideError, Result, Venue};

use crate::venue::{venue_id_from_link, VenueWindowResolver};

/// Date format of results tables and explicit `--dates`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Link fragments that mark a rebooking (rain-out) flow
pub const REBOOK_MARKERS: [&str; 2] = ["rebookcp", "rainedout"];

/// What to search for in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTarget {
    /// Availability (or rebook) page to start from
    pub link: String,
    /// Substring of the results row label, e.g. "12:00 p.m."
    pub time_label: String,
    /// Candidate dates, `YYYY-MM-DD`, in search order
    pub dates: Vec<String>,
}

/// Raw run options, before validation
#[derive(Debug, Clone, Default)]
pub struct TargetRequest {
    pub link: String,
    pub time_label: String,
    pub venue_id: Option<u32>,
    pub dates: Option<Vec<String>>,
}

/// A validated run: where to go, which venue profile applies, which flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: BookingTarget,
    pub venue: Venue,
    pub rebook: bool,
}

/// Whether the link starts a rebooking flow
pub fn is_rebook_link(link: &str) -> bool {
    REBOOK_MARKERS.iter().any(|marker| link.contains(marker))
}

/// Normalize an explicit date to `YYYY-MM-DD`
pub fn parse_date(date: &str) -> Result<String> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| CourtsideError::InvalidDate(date.to_string()))
}

/// `today` plus the venue's booking window
pub fn window_date(today: NaiveDate, window_days: u32) -> Result<String> {
    today
        .checked_add_days(Days::new(u64::from(window_days)))
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(|| {
            CourtsideError::InvalidDate(format!("{} + {} days", today, window_days))
        })
}

impl ResolvedTarget {
    /// Validate run options against the venue table
    ///
    /// Rebook links carry no venue id, so one must be given explicitly.
    /// Otherwise the id defaults to the link's trailing path segment.
    pub fn resolve(
        request: TargetRequest,
        resolver: &VenueWindowResolver,
        today: NaiveDate,
    ) -> Result<Self> {
        let rebook = is_rebook_link(&request.link);

        let venue_id = match (rebook, request.venue_id) {
            (_, Some(id)) => id,
            (true, None) => {
                return Err(CourtsideError::Config(
                    "Need to provide a venue id (--id) for rebooking".to_string(),
                ))
            }
            (false, None) => venue_id_from_link(&request.link)?,
        };
        let venue = resolver.venue(venue_id)?;

        let dates = match request.dates {
            Some(dates) if !dates.is_empty() => dates
                .iter()
                .map(|d| parse_date(d))
                .collect::<Result<Vec<_>>>()?,
            _ => vec![window_date(today, venue.window_days)?],
        };

        Ok(Self {
            target: BookingTarget {
                link: request.link,
                time_label: request.time_label,
                dates,
            },
            venue,
            rebook,
        })
    }
}
