//! Plant selection through the agent, with answer validation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::error::AgentError;
use super::llm::ChatBackend;
use super::orchestrator::{AgentRun, Orchestrator};
use super::tools::{EdiblePlantsTool, PLANTS_TOOL, REGION_TOOL, RegionToSeasonTool, ToolRegistry};
use crate::catalog::PlantCatalog;
use crate::locator::RegionClassifier;
use crate::models::AgentPlant;

const SYSTEM_PROMPT: &str = "You are a foraging assistant. To answer, first call \
region_to_season with the user's region and date. Then call get_edible_plants with \
the climate and season it returned, unchanged. Finally reply with JSON only, no prose, \
in the form {\"plants\": [{\"name\": \"<scientific name>\", \"common_name\": \"<common name>\"}]}, \
listing exactly the plants get_edible_plants returned. If it returned none, reply {\"plants\": []}.";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Wrapped { plants: Vec<AgentPlant> },
    Bare(Vec<AgentPlant>),
}

pub struct PlantAgent {
    orchestrator: Orchestrator,
}

impl PlantAgent {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        classifier: RegionClassifier,
        catalog: Arc<PlantCatalog>,
        max_steps: u32,
    ) -> Result<Self, AgentError> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(RegionToSeasonTool::new(classifier)))?;
        registry.register(Arc::new(EdiblePlantsTool::new(catalog)))?;

        Ok(Self {
            orchestrator: Orchestrator::new(backend, registry, max_steps),
        })
    }

    /// Ask the agent for the plants of `region` on `date`.
    pub async fn select(&self, region: &str, date: NaiveDate) -> Result<Vec<AgentPlant>, AgentError> {
        let user = format!(
            "Which edible wild plants can I forage in {region}? Today is {}.",
            date.format("%Y-%m-%d")
        );
        let run = self.orchestrator.run(SYSTEM_PROMPT, &user).await?;
        let plants = validate_selection(&run, region, date)?;
        info!(region, plants = plants.len(), "agent selection accepted");
        Ok(plants)
    }
}

/// Climate and season labels returned by the region tool
#[derive(Debug, Deserialize, PartialEq, Eq)]
struct ZoneLabels {
    climate: String,
    season: String,
}

/// Parse the final answer and check it against what the tools returned.
///
/// Only lookups made for the requested region and date count: the plant
/// tool must have been called with the labels the region tool produced for
/// that request, and every answered plant must come from such a call.
pub fn validate_selection(
    run: &AgentRun,
    region: &str,
    date: NaiveDate,
) -> Result<Vec<AgentPlant>, AgentError> {
    let zone = requested_zone(run, region, date)?;

    let mut offered: HashSet<String> = HashSet::new();
    let mut plants_called = false;
    let mut plants_matched = false;
    for (arguments, output) in successes(run, PLANTS_TOOL) {
        plants_called = true;
        let Ok(asked) = serde_json::from_value::<ZoneLabels>(arguments.clone()) else {
            continue;
        };
        if asked.climate.trim() != zone.climate || asked.season.trim() != zone.season {
            warn!(
                climate = %asked.climate,
                season = %asked.season,
                "plant lookup ignored, it does not match {}/{}",
                zone.climate,
                zone.season
            );
            continue;
        }
        plants_matched = true;
        let listed: Vec<AgentPlant> = serde_json::from_value(output.clone())
            .map_err(|e| AgentError::MalformedOutput(format!("plant tool output: {e}")))?;
        offered.extend(listed.into_iter().map(|p| p.common_name));
    }
    if !plants_called {
        return Err(AgentError::MissingToolCall(PLANTS_TOOL.to_owned()));
    }
    if !plants_matched {
        return Err(AgentError::ArgumentMismatch(format!(
            "{PLANTS_TOOL} was never called with {}/{}",
            zone.climate, zone.season
        )));
    }

    let answer = parse_answer(&run.answer)?;

    let mut seen = HashSet::new();
    let mut plants = Vec::with_capacity(answer.len());
    for plant in answer {
        if !offered.contains(&plant.common_name) {
            warn!(plant = %plant.common_name, "agent answered with a plant it was not offered");
            return Err(AgentError::UnknownPlant(plant.common_name));
        }
        if seen.insert(plant.common_name.clone()) {
            plants.push(plant);
        }
    }
    Ok(plants)
}

/// Labels from the last region lookup made for `region` on `date`.
fn requested_zone(run: &AgentRun, region: &str, date: NaiveDate) -> Result<ZoneLabels, AgentError> {
    let wanted = region.trim().to_lowercase();
    let mut called = false;
    let mut zone = None;

    for (arguments, output) in successes(run, REGION_TOOL) {
        called = true;
        let asked_region = arguments.get("region").and_then(Value::as_str).unwrap_or_default();
        let asked_date = arguments
            .get("date")
            .and_then(Value::as_str)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());

        if asked_region.trim().to_lowercase() != wanted || asked_date != Some(date) {
            warn!(region = asked_region, "region lookup ignored, it does not match the request");
            continue;
        }
        let labels: ZoneLabels = serde_json::from_value(output.clone())
            .map_err(|e| AgentError::MalformedOutput(format!("region tool output: {e}")))?;
        zone = Some(labels);
    }

    match zone {
        Some(zone) => Ok(zone),
        None if called => Err(AgentError::ArgumentMismatch(format!(
            "{REGION_TOOL} was never called for '{}' on {date}",
            region.trim()
        ))),
        None => Err(AgentError::MissingToolCall(REGION_TOOL.to_owned())),
    }
}

/// Arguments and output of each successful call to `tool`, in call order
fn successes<'a>(run: &'a AgentRun, tool: &'a str) -> impl Iterator<Item = (&'a Value, &'a Value)> {
    run.invocations
        .iter()
        .filter(move |inv| inv.tool == tool)
        .filter_map(|inv| inv.output.as_ref().ok().map(|output| (&inv.arguments, output)))
}

/// Decode `{"plants": [...]}` or a bare list, tolerating a markdown code fence.
pub fn parse_answer(raw: &str) -> Result<Vec<AgentPlant>, AgentError> {
    let trimmed = strip_code_fence(raw.trim());
    if trimmed.is_empty() {
        return Err(AgentError::MalformedOutput("empty answer".to_owned()));
    }

    match serde_json::from_str::<RawAnswer>(trimmed) {
        Ok(RawAnswer::Wrapped { plants } | RawAnswer::Bare(plants)) => Ok(plants),
        Err(e) => Err(AgentError::MalformedOutput(format!("{e}: {trimmed}"))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the language tag line, if any
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
