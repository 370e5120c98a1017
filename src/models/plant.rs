//! Plant records, enriched plants and the endpoint report

use serde::{Deserialize, Serialize};

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    #[serde(default)]
    pub scientific_name: Option<String>,
    pub common_name: String,
}

impl PlantRecord {
    #[must_use]
    pub fn new(common_name: impl Into<String>, scientific_name: Option<&str>) -> Self {
        Self {
            scientific_name: scientific_name.map(str::to_string),
            common_name: common_name.into(),
        }
    }
}

/// A plant with description, image and recipe link.
///
/// Placeholder records carry `"No info found"` and empty links, so all four
/// fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPlant {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub recipe_link: String,
}

/// Body of `GET /plants`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantReport {
    pub region: String,
    pub climate_zone: String,
    pub season: String,
    pub plants: Vec<EnrichedPlant>,
}

/// One entry of the agent's structured answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPlant {
    /// Scientific name as chosen by the agent (may repeat the common name)
    pub name: String,
    pub common_name: String,
}

impl From<&PlantRecord> for AgentPlant {
    fn from(record: &PlantRecord) -> Self {
        Self {
            name: record
                .scientific_name
                .clone()
                .unwrap_or_else(|| record.common_name.clone()),
            common_name: record.common_name.clone(),
        }
    }
}
