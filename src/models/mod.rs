//! Data models for the ForageGuide service
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and the resolved region
//! - Zone: Climate band and season classification outcome
//! - Plant: Catalog records, enriched plants and the response report

pub mod location;
pub mod plant;
pub mod zone;

// Re-export all public types for convenient access
pub use location::{Coordinates, Location};
pub use plant::{AgentPlant, EnrichedPlant, PlantRecord, PlantReport};
pub use zone::{UNKNOWN, Zone, ZoneReport};
