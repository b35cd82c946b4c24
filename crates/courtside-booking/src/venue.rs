//! Venue lookup and booking-window resolution

use courtside_core::{CourtsideError, Result, Venue};

/// Maps venue ids onto their static profiles
#[derive(Debug, Clone)]
pub struct VenueWindowResolver {
    venues: Vec<Venue>,
}

impl VenueWindowResolver {
    /// Resolver over the built-in venue profiles
    pub fn new() -> Self {
        Self::with_venues(Venue::KNOWN.to_vec())
    }

    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// Full profile for a venue id
    pub fn venue(&self, venue_id: u32) -> Result<Venue> {
        self.venues
            .iter()
            .find(|v| v.id == venue_id)
            .copied()
            .ok_or(CourtsideError::UnknownVenue(venue_id))
    }

    /// Default lead time, in days, for booking at a venue
    pub fn resolve(&self, venue_id: u32) -> Result<u32> {
        self.venue(venue_id).map(|v| v.window_days)
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }
}

impl Default for VenueWindowResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Venue id from the trailing path segment of an availability URL
pub fn venue_id_from_link(link: &str) -> Result<u32> {
    let without_query = link.split(['?', '#']).next().unwrap_or(link);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| CourtsideError::InvalidVenueLink(link.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_venues() {
        let resolver = VenueWindowResolver::new();
        assert_eq!(resolver.resolve(12).unwrap(), 30);
        assert_eq!(resolver.resolve(11).unwrap(), 7);
        for venue in Venue::KNOWN {
            assert_eq!(resolver.resolve(venue.id).unwrap(), venue.window_days);
        }
    }

    #[test]
    fn test_resolve_unknown_venue() {
        let resolver = VenueWindowResolver::new();
        let err = resolver.resolve(13).unwrap_err();
        assert!(matches!(err, CourtsideError::UnknownVenue(13)));
    }

    #[test]
    fn test_venue_id_from_link() {
        assert_eq!(
            venue_id_from_link("https://www.nycgovparks.org/tennisreservation/availability/12")
                .unwrap(),
            12
        );
        assert_eq!(
            venue_id_from_link("https://www.nycgovparks.org/tennisreservation/availability/11/")
                .unwrap(),
            11
        );
        assert_eq!(
            venue_id_from_link("https://example.com/availability/11?week=2").unwrap(),
            11
        );
    }

    #[test]
    fn test_venue_id_from_bad_link() {
        let err = venue_id_from_link("https://www.nycgovparks.org/tennisreservation/rebookcp")
            .unwrap_err();
        assert!(matches!(err, CourtsideError::InvalidVenueLink(_)));
    }
}
