//! Species records and row normalisation
//!
//! Every tier hands rows over as loosely-keyed JSON objects. The bundled
//! catalog still carries the spreadsheet headers (`"English name"`,
//! `" Slope "`, `" Intercept "`), the remote table uses snake_case columns.
//! Both collapse onto the same canonical keys here so callers only ever see
//! `SpeciesRecord`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Informational regulations shown on the species card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Regulations {
    pub size_limit: Option<String>,
    pub bag_limit: Option<String>,
    pub closed_season: Option<String>,
}

impl Regulations {
    fn is_empty(&self) -> bool {
        self.size_limit.is_none() && self.bag_limit.is_none() && self.closed_season.is_none()
    }
}

/// One species and its length-weight coefficients
///
/// `slope` is the additive log-space constant and `intercept` the exponent on
/// ln(length). The labels come from the source spreadsheet and are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub english_name: String,
    pub afrikaans_name: Option<String>,
    pub scientific_name: Option<String>,
    pub slope: f64,
    pub intercept: f64,
    pub image_ref: Option<String>,
    pub distribution_map_ref: Option<String>,
    pub regulations: Option<Regulations>,
}

/// Canonical key -> accepted aliases (after normalisation)
const ENGLISH_NAME: &[&str] = &["english_name", "name", "common_name"];
const AFRIKAANS_NAME: &[&str] = &["afrikaans_name", "afrikaans"];
const SCIENTIFIC_NAME: &[&str] = &["scientific_name", "latin_name"];
const SLOPE: &[&str] = &["slope"];
const INTERCEPT: &[&str] = &["intercept"];
const IMAGE: &[&str] = &["image_ref", "image_url", "image"];
const DISTRIBUTION_MAP: &[&str] = &["distribution_map_ref", "distribution_map", "map"];
const SIZE_LIMIT: &[&str] = &["size_limit"];
const BAG_LIMIT: &[&str] = &["bag_limit"];
const CLOSED_SEASON: &[&str] = &["closed_season"];

/// Normalise a column/key name: trim, lowercase, spaces and dashes to `_`
///
/// `" Slope "` -> `"slope"`, `"English name"` -> `"english_name"`
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

struct NormalizedRow<'a> {
    fields: FxHashMap<String, &'a Value>,
}

impl<'a> NormalizedRow<'a> {
    fn new(row: &'a Map<String, Value>) -> Self {
        let mut fields = FxHashMap::default();
        for (key, value) in row {
            // First spelling wins if a row carries both " Slope " and "slope"
            fields.entry(normalize_key(key)).or_insert(value);
        }
        Self { fields }
    }

    fn lookup(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .find_map(|alias| self.fields.get(*alias).copied())
            .filter(|v| !v.is_null())
    }

    fn text(&self, aliases: &[&str]) -> Option<String> {
        self.lookup(aliases).and_then(value_to_text)
    }

    /// Missing or unparsable numbers become NaN; the record is still kept
    fn number(&self, aliases: &[&str]) -> f64 {
        self.lookup(aliases).map(value_to_f64).unwrap_or(f64::NAN)
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

impl SpeciesRecord {
    pub fn new(english_name: impl Into<String>, slope: f64, intercept: f64) -> Self {
        Self {
            english_name: english_name.into(),
            afrikaans_name: None,
            scientific_name: None,
            slope,
            intercept,
            image_ref: None,
            distribution_map_ref: None,
            regulations: None,
        }
    }

    pub fn with_scientific_name(mut self, name: impl Into<String>) -> Self {
        self.scientific_name = Some(name.into());
        self
    }

    /// Build a record from one row of any tier
    ///
    /// Returns `None` only when the row has no usable english name.
    pub fn from_row(row: &Map<String, Value>) -> Option<Self> {
        let row = NormalizedRow::new(row);
        let english_name = row.text(ENGLISH_NAME)?;

        let mut regulations = Regulations {
            size_limit: row.text(SIZE_LIMIT),
            bag_limit: row.text(BAG_LIMIT),
            closed_season: row.text(CLOSED_SEASON),
        };
        if let Some(Value::Object(nested)) = row.lookup(&["regulations"]) {
            let nested = NormalizedRow::new(nested);
            regulations.size_limit = regulations.size_limit.or_else(|| nested.text(SIZE_LIMIT));
            regulations.bag_limit = regulations.bag_limit.or_else(|| nested.text(BAG_LIMIT));
            regulations.closed_season = regulations
                .closed_season
                .or_else(|| nested.text(CLOSED_SEASON));
        }

        Some(Self {
            english_name,
            afrikaans_name: row.text(AFRIKAANS_NAME),
            scientific_name: row.text(SCIENTIFIC_NAME),
            slope: row.number(SLOPE),
            intercept: row.number(INTERCEPT),
            image_ref: row.text(IMAGE),
            distribution_map_ref: row.text(DISTRIBUTION_MAP),
            regulations: if regulations.is_empty() { None } else { Some(regulations) },
        })
    }

    pub fn has_finite_coefficients(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }

    /// "English (Scientific)" or just "English"
    pub fn display_name(&self) -> String {
        match self.scientific_name.as_deref().map(str::trim) {
            Some(sci) if !sci.is_empty() => format!("{} ({})", self.english_name, sci),
            _ => self.english_name.clone(),
        }
    }
}

impl fmt::Display for SpeciesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" Slope "), "slope");
        assert_eq!(normalize_key("English name"), "english_name");
        assert_eq!(normalize_key("  Distribution   map"), "distribution_map");
        assert_eq!(normalize_key("english_name"), "english_name");
        assert_eq!(normalize_key("Size-Limit"), "size_limit");
    }

    #[test]
    fn test_static_row_with_stray_whitespace() {
        let row = as_map(json!({
            "English name": "Bronze bream",
            " Slope ": -3.95,
            " Intercept ": 2.96,
            "Afrikaans name": "Bronsbrasem",
            "Scientific name": "Pachymetopon grande",
            "Size limit": "30 cm",
            "Bag limit": "2"
        }));

        let record = SpeciesRecord::from_row(&row).unwrap();
        assert_eq!(record.english_name, "Bronze bream");
        assert_eq!(record.slope, -3.95);
        assert_eq!(record.intercept, 2.96);
        assert_eq!(record.afrikaans_name.as_deref(), Some("Bronsbrasem"));
        let regs = record.regulations.unwrap();
        assert_eq!(regs.size_limit.as_deref(), Some("30 cm"));
        assert_eq!(regs.bag_limit.as_deref(), Some("2"));
        assert_eq!(regs.closed_season, None);
    }

    #[test]
    fn test_remote_row_with_nested_regulations() {
        let row = as_map(json!({
            "english_name": "Roman",
            "slope": "-4,1",
            "intercept": 3.05,
            "image_url": "roman.jpg",
            "regulations": { "closed_season": "None", "bag_limit": "2" }
        }));

        let record = SpeciesRecord::from_row(&row).unwrap();
        assert_eq!(record.slope, -4.1);
        assert_eq!(record.image_ref.as_deref(), Some("roman.jpg"));
        let regs = record.regulations.unwrap();
        assert_eq!(regs.closed_season.as_deref(), Some("None"));
        assert_eq!(regs.bag_limit.as_deref(), Some("2"));
    }

    #[test]
    fn test_malformed_coefficients_are_kept() {
        let row = as_map(json!({ "English name": "Galjoen", " Slope ": "n/a" }));

        let record = SpeciesRecord::from_row(&row).unwrap();
        assert!(record.slope.is_nan());
        assert!(record.intercept.is_nan());
        assert!(!record.has_finite_coefficients());
    }

    #[test]
    fn test_row_without_name_is_rejected() {
        assert!(SpeciesRecord::from_row(&as_map(json!({ " Slope ": 1.0 }))).is_none());
        assert!(SpeciesRecord::from_row(&as_map(json!({ "English name": "   " }))).is_none());
    }

    #[test]
    fn test_display_name() {
        let record =
            SpeciesRecord::new("Elf", -4.2, 3.0).with_scientific_name("Pomatomus saltatrix");
        assert_eq!(record.display_name(), "Elf (Pomatomus saltatrix)");
        assert_eq!(SpeciesRecord::new("Elf", 0.0, 0.0).display_name(), "Elf");
    }

    #[test]
    fn test_display_pads_like_display_name() {
        let record =
            SpeciesRecord::new("Elf", -4.2, 3.0).with_scientific_name("Pomatomus saltatrix");
        assert_eq!(record.to_string(), "Elf (Pomatomus saltatrix)");
        assert_eq!(format!("{:<8}|", SpeciesRecord::new("Elf", 0.0, 0.0)), "Elf     |");
    }
}
