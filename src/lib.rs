//! `ForageGuide` - seasonal edible plant guide
//!
//! Resolves a region to a climate band and season, looks up the edible
//! plants for that pair in a static catalog and enriches each one with a
//! knowledge-base summary, an image and a recipe link. An alternate path
//! lets an LLM agent drive the same lookups through tool calls.

pub mod agent;
pub mod api;
pub mod catalog;
pub mod climate;
pub mod config;
pub mod encyclopedia;
pub mod enricher;
pub mod error;
pub mod geocoding;
pub mod locator;
pub mod models;
pub mod service;
pub mod web;

// Re-export core types for public API
pub use catalog::PlantCatalog;
pub use climate::{ClimateBand, Hemisphere, Season};
pub use config::ForageConfig;
pub use encyclopedia::{Article, KnowledgeBase, LookupError, MediaWikiClient};
pub use enricher::PlantEnricher;
pub use error::ForageError;
pub use geocoding::{Geocoder, GoogleGeocoder};
pub use locator::RegionClassifier;
pub use models::{EnrichedPlant, Location, PlantRecord, PlantReport, ZoneReport};
pub use service::ForageService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForageError>;
