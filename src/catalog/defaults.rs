//! Built-in placeholder catalog (last tier)

use async_trait::async_trait;

use super::{CatalogSource, CatalogTier};
use crate::error::CatalogError;
use crate::species::SpeciesRecord;

/// Placeholder species so the calculator never starts empty
///
/// The coefficients are placeholders, not fitted values.
pub fn default_records() -> Vec<SpeciesRecord> {
    vec![
        SpeciesRecord::new("Largemouth Bass", 3.2, -4.5)
            .with_scientific_name("Micropterus salmoides"),
        SpeciesRecord::new("Rainbow Trout", 3.1, -4.6)
            .with_scientific_name("Oncorhynchus mykiss"),
    ]
}

pub struct BuiltinDefaults;

#[async_trait]
impl CatalogSource for BuiltinDefaults {
    fn tier(&self) -> CatalogTier {
        CatalogTier::Default
    }

    fn describe(&self) -> String {
        "built-in defaults".to_string()
    }

    async fn fetch(&self) -> Result<Vec<SpeciesRecord>, CatalogError> {
        Ok(default_records())
    }
}
