//! Error taxonomy for catalog loading and weight estimation
//!
//! Catalog errors never reach callers of `CatalogLoader::load()`; they are
//! recorded per tier and the loader moves on. Estimation errors surface as
//! "no result" in the consuming views.

use thiserror::Error;

use crate::catalog::CatalogTier;

/// A single tier could not supply species data
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{tier} catalog unavailable: {reason}")]
    DataSourceUnavailable { tier: CatalogTier, reason: String },
}

impl CatalogError {
    pub fn unavailable(tier: CatalogTier, reason: impl Into<String>) -> Self {
        CatalogError::DataSourceUnavailable {
            tier,
            reason: reason.into(),
        }
    }

    pub fn tier(&self) -> CatalogTier {
        match self {
            CatalogError::DataSourceUnavailable { tier, .. } => *tier,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    /// Length is non-positive, non-finite or could not be parsed
    #[error("invalid length: {0}")]
    InvalidInput(String),

    /// Valid length, but the coefficients produced an unusable weight
    #[error("no usable weight for length {length_cm} cm (slope {slope}, intercept {intercept})")]
    InvalidCalculation {
        slope: f64,
        intercept: f64,
        length_cm: f64,
    },
}

/// Bad environment value
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}
