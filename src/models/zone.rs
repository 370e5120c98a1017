//! Classification outcome for a region on a date

use serde::Serialize;

use crate::climate::{ClimateBand, Hemisphere, Season};
use crate::models::Location;

/// Sentinel reported for climate and season when the region is not found
pub const UNKNOWN: &str = "Unknown";

/// A classified region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub location: Location,
    pub climate: ClimateBand,
    pub hemisphere: Hemisphere,
    pub season: Season,
}

/// Result of classifying a region; `Unknown` when the geocoder has no match
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneReport {
    Classified(Zone),
    Unknown,
}

impl ZoneReport {
    #[must_use]
    pub fn climate_label(&self) -> &'static str {
        match self {
            ZoneReport::Classified(zone) => zone.climate.as_str(),
            ZoneReport::Unknown => UNKNOWN,
        }
    }

    #[must_use]
    pub fn season_label(&self) -> &'static str {
        match self {
            ZoneReport::Classified(zone) => zone.season.as_str(),
            ZoneReport::Unknown => UNKNOWN,
        }
    }

    #[must_use]
    pub fn zone(&self) -> Option<&Zone> {
        match self {
            ZoneReport::Classified(zone) => Some(zone),
            ZoneReport::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let report = ZoneReport::Classified(Zone {
            location: Location::new("Quito", -0.18, -78.47),
            climate: ClimateBand::Tropical,
            hemisphere: Hemisphere::Southern,
            season: Season::Fall,
        });
        assert_eq!(report.climate_label(), "Tropical");
        assert_eq!(report.season_label(), "Fall");
        assert!(report.zone().is_some());

        assert_eq!(ZoneReport::Unknown.climate_label(), UNKNOWN);
        assert_eq!(ZoneReport::Unknown.season_label(), UNKNOWN);
        assert!(ZoneReport::Unknown.zone().is_none());
    }
}
