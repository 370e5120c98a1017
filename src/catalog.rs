//! Plant catalog
//!
//! A declarative table from (climate band, season) to an ordered list of
//! edible plants. The bundled table lives in `data/catalog.json`; pairs that
//! the table does not list have no plants.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::climate::{ClimateBand, Season};
use crate::models::PlantRecord;
use crate::{ForageError, Result};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    climate: ClimateBand,
    season: Season,
    plants: Vec<PlantRecord>,
}

/// A populated (climate, season) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub climate: ClimateBand,
    pub season: Season,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct PlantCatalog {
    table: HashMap<(ClimateBand, Season), Vec<PlantRecord>>,
    /// Populated pairs in file order
    order: Vec<(ClimateBand, Season)>,
}

impl PlantCatalog {
    /// The table compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Read a catalog file, once, at startup.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForageError::catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded plant catalog from {}", path.display());
        Ok(catalog)
    }

    /// Parse and validate a catalog document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw)
            .map_err(|e| ForageError::catalog(format!("invalid catalog: {e}")))?;

        let mut table = HashMap::with_capacity(file.entries.len());
        let mut order = Vec::with_capacity(file.entries.len());

        for entry in file.entries {
            let key = (entry.climate, entry.season);
            if let Some(blank) = entry.plants.iter().find(|p| p.common_name.trim().is_empty()) {
                return Err(ForageError::catalog(format!(
                    "{}/{} has a plant without a common name ({:?})",
                    entry.climate, entry.season, blank.scientific_name
                )));
            }
            if table.insert(key, entry.plants).is_some() {
                return Err(ForageError::catalog(format!(
                    "{}/{} is listed more than once",
                    entry.climate, entry.season
                )));
            }
            order.push(key);
        }

        Ok(Self { table, order })
    }

    /// Plants for an exact (climate, season) pair, in table order.
    ///
    /// Unlisted pairs return an empty list.
    #[must_use]
    pub fn plants_for(&self, climate: ClimateBand, season: Season) -> Vec<PlantRecord> {
        self.table
            .get(&(climate, season))
            .cloned()
            .unwrap_or_default()
    }

    /// Populated pairs with their plant counts.
    #[must_use]
    pub fn coverage(&self) -> Vec<CoverageEntry> {
        self.order
            .iter()
            .map(|&(climate, season)| CoverageEntry {
                climate,
                season,
                count: self.table.get(&(climate, season)).map_or(0, Vec::len),
            })
            .collect()
    }
}
