//! Climate band, hemisphere and season classification
//!
//! Pure decision tables: latitude → climate band and hemisphere,
//! calendar month + hemisphere → season.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ForageError;

/// Upper bound (exclusive) of `|lat|` for the tropical band
pub const TROPICAL_LIMIT: f64 = 23.5;
/// Upper bound (exclusive) of `|lat|` for the temperate band
pub const TEMPERATE_LIMIT: f64 = 66.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateBand {
    Tropical,
    Temperate,
    Polar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Northern,
    Southern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl ClimateBand {
    /// Classify a latitude in decimal degrees.
    #[must_use]
    pub fn from_latitude(latitude: f64) -> Self {
        let abs = latitude.abs();
        if abs < TROPICAL_LIMIT {
            ClimateBand::Tropical
        } else if abs < TEMPERATE_LIMIT {
            ClimateBand::Temperate
        } else {
            ClimateBand::Polar
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClimateBand::Tropical => "Tropical",
            ClimateBand::Temperate => "Temperate",
            ClimateBand::Polar => "Polar",
        }
    }
}

impl Hemisphere {
    /// The equator counts as Northern.
    #[must_use]
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude >= 0.0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        }
    }
}

impl Season {
    /// Season two quarters away (Spring↔Fall, Summer↔Winter).
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Season::Spring => Season::Fall,
            Season::Summer => Season::Winter,
            Season::Fall => Season::Spring,
            Season::Winter => Season::Summer,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Season for a calendar month (1-12) in the given hemisphere.
pub fn season_for_month(month: u32, hemisphere: Hemisphere) -> crate::Result<Season> {
    let northern = match month {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Fall,
        12 | 1 | 2 => Season::Winter,
        _ => {
            return Err(ForageError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
    };

    Ok(match hemisphere {
        Hemisphere::Northern => northern,
        Hemisphere::Southern => northern.opposite(),
    })
}

/// Season at `latitude` on `date`; the day of month is ignored.
#[must_use]
pub fn season_for_date(date: NaiveDate, latitude: f64) -> Season {
    let hemisphere = Hemisphere::from_latitude(latitude);
    // NaiveDate::month() is always within 1..=12
    season_for_month(date.month(), hemisphere).unwrap_or(Season::Winter)
}

impl Display for ClimateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClimateBand {
    type Err = ForageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Tropical" => Ok(ClimateBand::Tropical),
            "Temperate" => Ok(ClimateBand::Temperate),
            "Polar" => Ok(ClimateBand::Polar),
            other => Err(ForageError::validation(format!("unknown climate band '{other}'"))),
        }
    }
}

impl FromStr for Season {
    type Err = ForageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Spring" => Ok(Season::Spring),
            "Summer" => Ok(Season::Summer),
            "Fall" => Ok(Season::Fall),
            "Winter" => Ok(Season::Winter),
            other => Err(ForageError::validation(format!("unknown season '{other}'"))),
        }
    }
}
