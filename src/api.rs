use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::CoverageEntry;
use crate::models::{EnrichedPlant, PlantReport};
use crate::service::ForageService;
use crate::{ForageError, Result, VERSION};

pub type AppState = Arc<ForageService>;

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub region: String,
    /// `YYYY-MM-DD`; today's local date when absent
    pub date: Option<String>,
}

impl RegionQuery {
    fn date(&self) -> Result<NaiveDate> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(Local::now().date_naive()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ForageError::validation(format!("date '{raw}' is not in YYYY-MM-DD format"))
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub agent_enabled: bool,
    pub catalog_coverage: Vec<CoverageEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plants", get(get_plants))
        .route("/plants/", get(get_plants))
        .route("/agent/plants", get(get_agent_plants))
        .route("/health", get(get_health))
        .with_state(state)
}

async fn get_plants(
    State(service): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<PlantReport>> {
    let date = query.date()?;
    let report = service.plants_for_region(&query.region, date).await?;
    Ok(Json(report))
}

async fn get_agent_plants(
    State(service): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<Vec<EnrichedPlant>>> {
    let date = query.date()?;
    let plants = service.agent_plants_for_region(&query.region, date).await?;
    Ok(Json(plants))
}

async fn get_health(State(service): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        agent_enabled: service.agent_enabled(),
        catalog_coverage: service.coverage(),
    })
}
