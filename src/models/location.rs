//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A geocoded region
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Name reported by the geocoder (formatted address)
    pub name: String,
    pub coordinates: Coordinates,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!(
            "{:.4}, {:.4}",
            self.coordinates.latitude, self.coordinates.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        let location = Location::new("Seattle, WA, USA", 47.606_209, -122.332_071);
        assert_eq!(location.format_coordinates(), "47.6062, -122.3321");
        assert_eq!(location.latitude(), 47.606_209);
    }
}
