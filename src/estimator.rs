//! Length-to-weight estimation
//!
//! Allometric model evaluated in log space:
//!
//! ```text
//! weight_kg = exp(slope + ln(length_cm) × intercept)
//! ```
//!
//! Coefficients are per species for centimetres in, kilograms out. No unit
//! conversion happens here.

use std::fmt;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::EstimateError;
use crate::species::SpeciesRecord;

/// Transient calculation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightEstimate {
    pub weight_kg: f64,
}

impl WeightEstimate {
    /// Display precision (3 decimals, kg)
    pub fn rounded_kg(&self) -> f64 {
        (self.weight_kg * 1000.0).round() / 1000.0
    }
}

impl fmt::Display for WeightEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} kg", self.weight_kg)
    }
}

/// Raw formula, no checks
pub fn evaluate_weight(slope: f64, intercept: f64, length_cm: f64) -> f64 {
    libm::exp(slope + libm::log(length_cm) * intercept)
}

/// Accept only finite, strictly positive weights
pub fn classify_weight(raw: f64) -> Option<f64> {
    if raw.is_finite() && raw > 0.0 {
        Some(raw)
    } else {
        None
    }
}

/// Estimate weight for a species at `length_cm`
///
/// Callers validate the length first (see [`validate_length_cm`]). A length
/// that slips through still degenerates to `0`, `inf` or `NaN` and is
/// reported as `InvalidCalculation`, as are corrupt coefficients.
pub fn estimate_weight(
    record: &SpeciesRecord,
    length_cm: f64,
) -> Result<WeightEstimate, EstimateError> {
    let raw = evaluate_weight(record.slope, record.intercept, length_cm);

    classify_weight(raw)
        .map(|weight_kg| WeightEstimate { weight_kg })
        .ok_or(EstimateError::InvalidCalculation {
            slope: record.slope,
            intercept: record.intercept,
            length_cm,
        })
}

/// Caller-side check: finite and > 0
pub fn validate_length_cm(length_cm: f64) -> Result<f64, EstimateError> {
    if length_cm.is_finite() && length_cm > 0.0 {
        Ok(length_cm)
    } else {
        Err(EstimateError::InvalidInput(format!(
            "length must be a positive number of centimetres, got {}",
            length_cm
        )))
    }
}

/// Parse a text-field length ("40", " 40.5 ", "40,5")
pub fn parse_length_cm(text: &str) -> Result<f64, EstimateError> {
    let trimmed = text.trim();
    let length: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| EstimateError::InvalidInput(format!("'{}' is not a number", trimmed)))?;

    validate_length_cm(length)
}

/// Calculator / gallery flow: name + text length -> estimate or no result
pub fn estimate_for_species(
    catalog: &Catalog,
    species_name: &str,
    length_text: &str,
) -> Option<WeightEstimate> {
    let Some(record) = catalog.get(species_name) else {
        tracing::debug!("No species named '{}' in catalog", species_name);
        return None;
    };

    let result = parse_length_cm(length_text).and_then(|length| estimate_weight(record, length));

    match result {
        Ok(estimate) => Some(estimate),
        Err(e) => {
            tracing::debug!("No weight for '{}': {}", record.english_name, e);
            None
        }
    }
}
