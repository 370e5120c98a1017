//! Forage service
//!
//! Ties the region classifier, the plant catalog, the enricher and the
//! optional agent together behind the two request paths.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::agent::{ChatBackend, OpenAiChat, PlantAgent};
use crate::catalog::{CoverageEntry, PlantCatalog};
use crate::config::ForageConfig;
use crate::encyclopedia::{KnowledgeBase, MediaWikiClient};
use crate::enricher::PlantEnricher;
use crate::geocoding::{Geocoder, GoogleGeocoder};
use crate::locator::RegionClassifier;
use crate::models::{EnrichedPlant, PlantReport, ZoneReport};
use crate::{ForageError, Result};

pub struct ForageService {
    classifier: RegionClassifier,
    catalog: Arc<PlantCatalog>,
    enricher: PlantEnricher,
    agent: Option<PlantAgent>,
}

impl ForageService {
    /// Service without the agent path.
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        catalog: PlantCatalog,
    ) -> Self {
        Self {
            classifier: RegionClassifier::new(geocoder),
            catalog: Arc::new(catalog),
            enricher: PlantEnricher::new(knowledge_base),
            agent: None,
        }
    }

    /// Enable the agent path on top of the same classifier and catalog.
    pub fn with_agent(mut self, backend: Arc<dyn ChatBackend>, max_steps: u32) -> Result<Self> {
        let agent = PlantAgent::new(
            backend,
            self.classifier.clone(),
            Arc::clone(&self.catalog),
            max_steps,
        )?;
        self.agent = Some(agent);
        Ok(self)
    }

    /// Build the production service with HTTP clients from `config`.
    pub fn from_config(config: &ForageConfig) -> Result<Self> {
        let catalog = match &config.catalog.path {
            Some(path) => PlantCatalog::from_path(path)?,
            None => PlantCatalog::bundled()?,
        };
        for entry in catalog.coverage() {
            info!(
                "Catalog covers {}/{} with {} plants",
                entry.climate, entry.season, entry.count
            );
        }

        let geocoder = Arc::new(GoogleGeocoder::new(&config.geocoding)?);
        let knowledge_base = Arc::new(MediaWikiClient::new(&config.encyclopedia)?);
        let service = Self::new(geocoder, knowledge_base, catalog);

        if !config.agent_enabled() {
            info!("No LLM API key configured, agent endpoint disabled");
            return Ok(service);
        }
        let backend = Arc::new(OpenAiChat::new(&config.agent)?);
        info!("Agent endpoint enabled with model {}", config.agent.model);
        service.with_agent(backend, config.agent.max_steps)
    }

    #[must_use]
    pub fn agent_enabled(&self) -> bool {
        self.agent.is_some()
    }

    #[must_use]
    pub fn coverage(&self) -> Vec<CoverageEntry> {
        self.catalog.coverage()
    }

    /// Classify the region, look up its plants and enrich them.
    #[instrument(skip(self))]
    pub async fn plants_for_region(&self, region: &str, date: NaiveDate) -> Result<PlantReport> {
        let report = self.classifier.classify(region, date).await?;

        let plants = match &report {
            ZoneReport::Classified(zone) => self.catalog.plants_for(zone.climate, zone.season),
            ZoneReport::Unknown => Vec::new(),
        };
        let names: Vec<String> = plants.into_iter().map(|p| p.common_name).collect();
        let enriched = self.enricher.enrich_all(&names).await;

        info!(
            "{} on {}: {} / {}, {} plants",
            region.trim(),
            date,
            report.climate_label(),
            report.season_label(),
            enriched.len()
        );

        Ok(PlantReport {
            region: region.to_string(),
            climate_zone: report.climate_label().to_string(),
            season: report.season_label().to_string(),
            plants: enriched,
        })
    }

    /// Let the agent pick the plants, then enrich its selection.
    #[instrument(skip(self))]
    pub async fn agent_plants_for_region(
        &self,
        region: &str,
        date: NaiveDate,
    ) -> Result<Vec<EnrichedPlant>> {
        let Some(agent) = &self.agent else {
            return Err(ForageError::agent_unavailable("no LLM API key configured"));
        };
        let region = region.trim();
        if region.is_empty() {
            return Err(ForageError::validation("Region cannot be empty"));
        }

        let selection = agent.select(region, date).await?;
        let names: Vec<String> = selection.into_iter().map(|p| p.common_name).collect();
        Ok(self.enricher.enrich_all(&names).await)
    }
}
