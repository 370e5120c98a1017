//! Region classification
//!
//! Resolves a region name to a coordinate through a [`Geocoder`] and
//! classifies it into a climate band and season for a calendar date.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::climate::{ClimateBand, Hemisphere, season_for_date};
use crate::geocoding::Geocoder;
use crate::models::{Location, Zone, ZoneReport};
use crate::{ForageError, Result};

/// Service for classifying regions
#[derive(Clone)]
pub struct RegionClassifier {
    geocoder: Arc<dyn Geocoder>,
}

impl RegionClassifier {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Classify `region` on `date`.
    ///
    /// Returns [`ZoneReport::Unknown`] when the geocoder has no match. Any
    /// geocoder failure is returned as an error and is not retried.
    pub async fn classify(&self, region: &str, date: NaiveDate) -> Result<ZoneReport> {
        let region = region.trim();
        if region.is_empty() {
            return Err(ForageError::validation("Region cannot be empty"));
        }

        debug!("Geocoding region: {}", region);
        let candidates = self.geocoder.geocode(region).await?;

        // Use the first (best) result
        let Some(location) = candidates.into_iter().next() else {
            info!("Region not found: {}", region);
            return Ok(ZoneReport::Unknown);
        };

        let zone = classify_location(location, date);
        info!(
            "Classified {} ({}) as {} / {}",
            region,
            zone.location.format_coordinates(),
            zone.climate,
            zone.season
        );
        Ok(ZoneReport::Classified(zone))
    }
}

/// Classify an already resolved location; only latitude is used.
#[must_use]
pub fn classify_location(location: Location, date: NaiveDate) -> Zone {
    let latitude = location.latitude();
    Zone {
        climate: ClimateBand::from_latitude(latitude),
        hemisphere: Hemisphere::from_latitude(latitude),
        season: season_for_date(date, latitude),
        location,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::climate::Season;
    use async_trait::async_trait;

    /// Geocoder answering from a fixed table
    pub(crate) struct FixedGeocoder {
        pub(crate) entries: Vec<(String, Location)>,
        pub(crate) fail: bool,
    }

    impl FixedGeocoder {
        pub(crate) fn with(region: &str, latitude: f64, longitude: f64) -> Self {
            Self {
                entries: vec![(
                    region.to_string(),
                    Location::new(region, latitude, longitude),
                )],
                fail: false,
            }
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, address: &str) -> Result<Vec<Location>> {
            if self.fail {
                return Err(ForageError::geocoding("geocoding API error 500"));
            }
            Ok(self
                .entries
                .iter()
                .filter(|(name, _)| name == address)
                .map(|(_, location)| location.clone())
                .collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_pacific_northwest_in_april() {
        let classifier = RegionClassifier::new(Arc::new(FixedGeocoder::with(
            "Pacific Northwest",
            47.75,
            -120.74,
        )));
        let report = classifier
            .classify("Pacific Northwest", date(2024, 4, 15))
            .await
            .unwrap();
        let zone = report.zone().unwrap();
        assert_eq!(zone.climate, ClimateBand::Temperate);
        assert_eq!(zone.hemisphere, Hemisphere::Northern);
        assert_eq!(zone.season, Season::Spring);
    }

    #[tokio::test]
    async fn test_southern_region_in_january() {
        let classifier =
            RegionClassifier::new(Arc::new(FixedGeocoder::with("Cape Town", -33.92, 18.42)));
        let report = classifier.classify("Cape Town", date(2024, 1, 10)).await.unwrap();
        assert_eq!(report.climate_label(), "Temperate");
        assert_eq!(report.season_label(), "Summer");
    }

    #[tokio::test]
    async fn test_unknown_region() {
        let classifier =
            RegionClassifier::new(Arc::new(FixedGeocoder::with("Cape Town", -33.92, 18.42)));
        let report = classifier.classify("Atlantis", date(2024, 1, 10)).await.unwrap();
        assert_eq!(report, ZoneReport::Unknown);
    }

    #[tokio::test]
    async fn test_geocoder_failure_propagates() {
        let geocoder = FixedGeocoder {
            entries: Vec::new(),
            fail: true,
        };
        let classifier = RegionClassifier::new(Arc::new(geocoder));
        let err = classifier.classify("Anywhere", date(2024, 1, 10)).await.unwrap_err();
        assert!(matches!(err, ForageError::Geocoding { .. }));
    }

    #[tokio::test]
    async fn test_blank_region_rejected() {
        let classifier =
            RegionClassifier::new(Arc::new(FixedGeocoder::with("x", 0.0, 0.0)));
        let err = classifier.classify("   ", date(2024, 1, 10)).await.unwrap_err();
        assert!(matches!(err, ForageError::Validation { .. }));
    }

    #[test]
    fn test_classify_location_ignores_longitude() {
        let a = classify_location(Location::new("a", 10.0, -170.0), date(2024, 7, 1));
        let b = classify_location(Location::new("b", 10.0, 170.0), date(2024, 7, 1));
        assert_eq!(a.climate, b.climate);
        assert_eq!(a.season, b.season);
        assert_eq!(a.climate, ClimateBand::Tropical);
        assert_eq!(a.season, Season::Summer);
    }
}
