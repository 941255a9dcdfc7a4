//! Bundled static catalog
//!
//! JSON array of objects (spreadsheet headers, stray whitespace included) or a
//! CSV export of the same sheet. CSV goes through Polars so column types are
//! inferred the same way as in the data pipeline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::{records_from_rows, CatalogSource, CatalogTier};
use crate::error::CatalogError;
use crate::species::SpeciesRecord;

enum Location {
    File(PathBuf),
    Url { client: reqwest::Client, url: String },
}

pub struct StaticFileSource {
    location: Location,
}

impl StaticFileSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// Same JSON shape, served over HTTP
    pub fn from_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            location: Location::Url {
                client,
                url: url.into(),
            },
        }
    }

    fn unavailable(reason: String) -> CatalogError {
        CatalogError::unavailable(CatalogTier::Bundled, reason)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Parse a JSON catalog body into raw rows
pub fn parse_json_rows(body: &str) -> Result<Vec<Value>> {
    serde_json::from_str(body).context("Static catalog is not a JSON array")
}

/// Load CSV rows as JSON objects keyed by the original headers
pub fn load_csv_rows(path: &Path) -> Result<Vec<Value>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load species CSV: {:?}", path))?;

    let mut rows = vec![Map::new(); df.height()];

    for column in df.get_columns() {
        let name = column.name().to_string();

        if let Ok(values) = column.str() {
            for (idx, row) in rows.iter_mut().enumerate() {
                if let Some(v) = values.get(idx) {
                    row.insert(name.clone(), Value::String(v.to_string()));
                }
            }
            continue;
        }

        let Ok(numeric) = column.cast(&DataType::Float64) else {
            continue;
        };
        let values = numeric
            .f64()
            .with_context(|| format!("Column '{}' is not numeric", name))?;
        for (idx, row) in rows.iter_mut().enumerate() {
            if let Some(v) = values.get(idx) {
                row.insert(name.clone(), Value::from(v));
            }
        }
    }

    Ok(rows.into_iter().map(Value::Object).collect())
}

#[async_trait]
impl CatalogSource for StaticFileSource {
    fn tier(&self) -> CatalogTier {
        CatalogTier::Bundled
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::File(path) => path.display().to_string(),
            Location::Url { url, .. } => url.clone(),
        }
    }

    async fn fetch(&self) -> Result<Vec<SpeciesRecord>, CatalogError> {
        let rows = match &self.location {
            Location::File(path) if is_csv(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || load_csv_rows(&path))
                    .await
                    .map_err(|e| Self::unavailable(format!("CSV loader panicked: {e}")))?
                    .map_err(|e| Self::unavailable(format!("{e:#}")))?
            }
            Location::File(path) => {
                let body = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Self::unavailable(format!("cannot read {}: {e}", path.display()))
                })?;
                parse_json_rows(&body).map_err(|e| Self::unavailable(format!("{e:#}")))?
            }
            Location::Url { client, url } => {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Self::unavailable(format!("fetch failed: {e}")))?;
                let body = response
                    .text()
                    .await
                    .map_err(|e| Self::unavailable(format!("fetch failed: {e}")))?;
                parse_json_rows(&body).map_err(|e| Self::unavailable(format!("{e:#}")))?
            }
        };

        Ok(records_from_rows(CatalogTier::Bundled, rows))
    }
}
