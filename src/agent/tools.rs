//! Tools exposed to the agent and the registry that holds them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::{AgentError, ToolError};
use crate::ForageError;
use crate::catalog::PlantCatalog;
use crate::climate::{ClimateBand, Season};
use crate::locator::RegionClassifier;
use crate::models::{AgentPlant, UNKNOWN};

pub const REGION_TOOL: &str = "region_to_season";
pub const PLANTS_TOOL: &str = "get_edible_plants";

/// Name, description and JSON schema the model sees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A named, described, invocable unit.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    /// Tools that must have succeeded earlier in the same run
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: self.parameters(),
        }
    }
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        if self.get(tool.name()).is_some() {
            return Err(AgentError::DuplicateTool(tool.name().to_owned()));
        }
        self.tools.push(tool);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Definitions in registration order
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct RegionArgs {
    region: String,
    date: String,
}

/// Region → climate band and season
pub struct RegionToSeasonTool {
    classifier: RegionClassifier,
}

impl RegionToSeasonTool {
    pub fn new(classifier: RegionClassifier) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Tool for RegionToSeasonTool {
    fn name(&self) -> &'static str {
        REGION_TOOL
    }

    fn description(&self) -> &'static str {
        "Determine the climate zone (Tropical, Temperate, Polar) and the current season \
         (Spring, Summer, Fall, Winter) of a region on a date. Returns Unknown for both \
         when the region cannot be found."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "region": {"type": "string", "description": "Region name, e.g. 'Pacific Northwest'"},
                "date": {"type": "string", "description": "ISO date, YYYY-MM-DD"}
            },
            "required": ["region", "date"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: RegionArgs = parse_args(args)?;
        let date = NaiveDate::parse_from_str(args.date.trim(), "%Y-%m-%d")
            .map_err(|e| ToolError::InvalidArguments(format!("date '{}': {e}", args.date)))?;

        let report = self
            .classifier
            .classify(&args.region, date)
            .await
            .map_err(|e| match e {
                ForageError::Validation { message } => ToolError::InvalidArguments(message),
                other => ToolError::Failed(other.to_string()),
            })?;

        Ok(json!({
            "climate": report.climate_label(),
            "season": report.season_label(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PlantArgs {
    climate: String,
    season: String,
}

/// (climate, season) → catalog plants
pub struct EdiblePlantsTool {
    catalog: Arc<PlantCatalog>,
}

impl EdiblePlantsTool {
    pub fn new(catalog: Arc<PlantCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for EdiblePlantsTool {
    fn name(&self) -> &'static str {
        PLANTS_TOOL
    }

    fn description(&self) -> &'static str {
        "List edible wild plants for a climate zone and season exactly as returned by \
         region_to_season. Returns a list of {name, common_name}."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "climate": {"type": "string", "enum": ["Tropical", "Temperate", "Polar", UNKNOWN]},
                "season": {"type": "string", "enum": ["Spring", "Summer", "Fall", "Winter", UNKNOWN]}
            },
            "required": ["climate", "season"],
            "additionalProperties": false
        })
    }

    fn requires(&self) -> &'static [&'static str] {
        &[REGION_TOOL]
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: PlantArgs = parse_args(args)?;

        // an unresolved region has no plants
        if args.climate.trim() == UNKNOWN || args.season.trim() == UNKNOWN {
            return Ok(json!([]));
        }

        let climate: ClimateBand = args
            .climate
            .parse()
            .map_err(|e: ForageError| ToolError::InvalidArguments(e.to_string()))?;
        let season: Season = args
            .season
            .parse()
            .map_err(|e: ForageError| ToolError::InvalidArguments(e.to_string()))?;

        let plants: Vec<AgentPlant> = self
            .catalog
            .plants_for(climate, season)
            .iter()
            .map(AgentPlant::from)
            .collect();

        serde_json::to_value(plants).map_err(|e| ToolError::Failed(e.to_string()))
    }
}
