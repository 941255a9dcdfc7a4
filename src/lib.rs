//! Catch Estimator
//!
//! Species reference resolution and length-to-weight estimation for the
//! fishing companion views (calculator, personal gallery, species info).
//!
//! - `catalog/`: layered catalog loading (remote table -> bundled file -> defaults)
//! - `search`: case-insensitive substring search over english names
//! - `estimator`: `exp(slope + ln(length_cm) × intercept)` with numeric validation
//! - `api_server`: optional Axum surface (`--features api`)

pub mod catalog;
pub mod config;
pub mod error;
pub mod estimator;
pub mod logging;
pub mod search;
pub mod species;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogLoader, CatalogSource, CatalogTier, LoadedCatalog};
pub use config::{CatalogConfig, ServerConfig};
pub use error::{CatalogError, ConfigError, EstimateError};
pub use estimator::{estimate_for_species, estimate_weight, parse_length_cm, WeightEstimate};
pub use search::search;
pub use species::{Regulations, SpeciesRecord};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
