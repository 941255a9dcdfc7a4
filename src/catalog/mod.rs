//! Species catalog and its layered loader
//!
//! Tiers are tried in order: remote table, bundled static file, built-in
//! defaults. The first tier that yields at least one record wins; tiers are
//! never merged. The loader cannot fail and never returns an empty catalog.

pub mod bundled;
pub mod defaults;
pub mod remote;

pub use bundled::StaticFileSource;
pub use defaults::{default_records, BuiltinDefaults};
pub use remote::{build_client, RemoteTableSource};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::CatalogError;
use crate::search::{search, search_limited};
use crate::species::SpeciesRecord;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogTier {
    Remote,
    Bundled,
    Default,
}

impl fmt::Display for CatalogTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogTier::Remote => "remote",
            CatalogTier::Bundled => "bundled",
            CatalogTier::Default => "default",
        })
    }
}

/// One fallback tier
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn tier(&self) -> CatalogTier;

    /// Human-readable location for logs (URL, path, "built-in")
    fn describe(&self) -> String;

    /// All records this tier can supply; empty is allowed and means "fall through"
    async fn fetch(&self) -> Result<Vec<SpeciesRecord>, CatalogError>;
}

/// In-memory species collection with case-insensitive name lookup
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<SpeciesRecord>,
    by_name: FxHashMap<String, usize>,
}

impl Catalog {
    /// Build from records, keeping the first of any case-insensitive duplicate
    pub fn new(records: Vec<SpeciesRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut by_name = FxHashMap::default();

        for record in records {
            let key = record.english_name.trim().to_lowercase();
            if key.is_empty() {
                tracing::warn!("Skipping species record with empty name");
                continue;
            }
            if by_name.contains_key(&key) {
                tracing::warn!("Skipping duplicate species '{}'", record.english_name);
                continue;
            }
            by_name.insert(key, kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            by_name,
        }
    }

    pub fn records(&self) -> &[SpeciesRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact name lookup, case-insensitive
    pub fn get(&self, name: &str) -> Option<&SpeciesRecord> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.records[idx])
    }

    pub fn search(&self, query: &str) -> Vec<&SpeciesRecord> {
        search(&self.records, query)
    }

    pub fn search_limited(&self, query: &str, limit: usize) -> Vec<&SpeciesRecord> {
        search_limited(&self.records, query, limit)
    }
}

/// Loader result: the catalog, which tier supplied it and why earlier tiers were skipped
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub tier: CatalogTier,
    pub skipped: Vec<CatalogError>,
}

/// Ordered list of catalog sources
pub struct CatalogLoader {
    sources: Vec<Box<dyn CatalogSource>>,
    timeout: Duration,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CatalogLoader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            timeout,
        }
    }

    /// Append a tier (tried after every tier added before it)
    pub fn with_source<S: CatalogSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn tiers(&self) -> Vec<CatalogTier> {
        self.sources.iter().map(|s| s.tier()).collect()
    }

    /// Try each tier in order; built-in defaults back everything
    pub async fn load(&self) -> LoadedCatalog {
        let mut skipped = Vec::new();
        let fallback = BuiltinDefaults;
        let tiers = self
            .sources
            .iter()
            .map(|s| s.as_ref())
            .chain(std::iter::once(&fallback as &dyn CatalogSource));

        for source in tiers {
            match self.attempt(source).await {
                Ok(catalog) => {
                    tracing::info!(
                        "Using {} catalog from {} ({} species)",
                        source.tier(),
                        source.describe(),
                        catalog.len()
                    );
                    return LoadedCatalog {
                        catalog,
                        tier: source.tier(),
                        skipped,
                    };
                }
                Err(e) => skipped.push(e),
            }
        }

        // Unreachable in practice: the in-process tier resolves on first poll
        LoadedCatalog {
            catalog: Catalog::new(default_records()),
            tier: CatalogTier::Default,
            skipped,
        }
    }

    async fn attempt(&self, source: &dyn CatalogSource) -> Result<Catalog, CatalogError> {
        let tier = source.tier();
        tracing::info!("Loading {} catalog from {}...", tier, source.describe());
        let start = Instant::now();

        let result = match tokio::time::timeout(self.timeout, source.fetch()).await {
            Ok(Ok(records)) => {
                let catalog = Catalog::new(records);
                if catalog.is_empty() {
                    Err(CatalogError::unavailable(tier, "no species records"))
                } else {
                    Ok(catalog)
                }
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CatalogError::unavailable(
                tier,
                format!("timed out after {:?}", self.timeout),
            )),
        };

        if let Err(ref e) = result {
            tracing::warn!("{} (after {:?})", e, start.elapsed());
        }
        result
    }
}

/// Turn raw JSON rows into records, skipping rows without a name
pub(crate) fn records_from_rows(tier: CatalogTier, rows: Vec<Value>) -> Vec<SpeciesRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let Value::Object(map) = row else {
            tracing::debug!("{} row {} is not an object, skipping", tier, idx);
            continue;
        };
        match SpeciesRecord::from_row(map) {
            Some(record) => {
                if !record.has_finite_coefficients() {
                    tracing::debug!(
                        "{} row {} ('{}') has non-finite coefficients",
                        tier,
                        idx,
                        record.english_name
                    );
                }
                records.push(record);
            }
            None => tracing::warn!("{} row {} has no english name, skipping", tier, idx),
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeSource {
        tier: CatalogTier,
        result: Result<Vec<SpeciesRecord>, String>,
        delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn ok(tier: CatalogTier, names: &[&str]) -> Self {
            Self {
                tier,
                result: Ok(names.iter().map(|n| SpeciesRecord::new(*n, 1.0, 1.0)).collect()),
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(tier: CatalogTier) -> Self {
            Self {
                result: Err("boom".to_string()),
                ..Self::ok(tier, &[])
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        fn tier(&self) -> CatalogTier {
            self.tier
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }

        async fn fetch(&self) -> Result<Vec<SpeciesRecord>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result
                .clone()
                .map_err(|reason| CatalogError::unavailable(self.tier, reason))
        }
    }

    fn names(loaded: &LoadedCatalog) -> Vec<&str> {
        loaded.catalog.iter().map(|r| r.english_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_first_non_empty_tier_wins() {
        let bundled = FakeSource::ok(CatalogTier::Bundled, &["Bronze bream"]);
        let bundled_calls = bundled.calls.clone();

        let loaded = CatalogLoader::default()
            .with_source(FakeSource::ok(CatalogTier::Remote, &["Roman", "Elf"]))
            .with_source(bundled)
            .load()
            .await;

        assert_eq!(loaded.tier, CatalogTier::Remote);
        assert_eq!(names(&loaded), vec!["Roman", "Elf"]);
        assert!(loaded.skipped.is_empty());
        assert_eq!(bundled_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_and_failing_tiers_fall_through_without_merging() {
        let loaded = CatalogLoader::default()
            .with_source(FakeSource::ok(CatalogTier::Remote, &[]))
            .with_source(FakeSource::failing(CatalogTier::Bundled))
            .load()
            .await;

        assert_eq!(loaded.tier, CatalogTier::Default);
        assert_eq!(names(&loaded), vec!["Largemouth Bass", "Rainbow Trout"]);
        let skipped: Vec<CatalogTier> = loaded.skipped.iter().map(|e| e.tier()).collect();
        assert_eq!(skipped, vec![CatalogTier::Remote, CatalogTier::Bundled]);
    }

    #[tokio::test]
    async fn test_no_sources_still_returns_defaults() {
        let loaded = CatalogLoader::default().load().await;
        assert_eq!(loaded.tier, CatalogTier::Default);
        assert!(!loaded.catalog.is_empty());
    }

    #[tokio::test]
    async fn test_slow_tier_times_out() {
        let slow = FakeSource {
            delay: Some(Duration::from_secs(10)),
            ..FakeSource::ok(CatalogTier::Remote, &["Roman"])
        };

        let loaded = CatalogLoader::new(Duration::from_millis(50))
            .with_source(slow)
            .with_source(FakeSource::ok(CatalogTier::Bundled, &["Bronze bream"]))
            .load()
            .await;

        assert_eq!(loaded.tier, CatalogTier::Bundled);
        assert_eq!(names(&loaded), vec!["Bronze bream"]);
        assert!(loaded.skipped[0].to_string().contains("timed out"));
    }

    #[test]
    fn test_catalog_lookup_and_duplicates() {
        let catalog = Catalog::new(vec![
            SpeciesRecord::new("Roman", 1.0, 1.0),
            SpeciesRecord::new("ROMAN", 2.0, 2.0),
            SpeciesRecord::new("", 3.0, 3.0),
            SpeciesRecord::new("Elf", 4.0, 4.0),
        ]);

        assert_eq!(catalog.len(), 2);
        let kept: Vec<&str> = catalog.records().iter().map(|r| r.english_name.as_str()).collect();
        assert_eq!(kept, vec!["Roman", "Elf"]);
        assert_eq!(catalog.get(" roman ").unwrap().slope, 1.0);
        assert_eq!(catalog.get("elf").unwrap().english_name, "Elf");
        assert!(catalog.get("kob").is_none());
    }

    #[test]
    fn test_records_from_rows_skips_unnamed() {
        let rows = vec![
            serde_json::json!({ "English name": "Roman", " Slope ": 1.5, " Intercept ": 2.5 }),
            serde_json::json!({ " Slope ": 1.0 }),
            serde_json::json!("not an object"),
        ];
        let records = records_from_rows(CatalogTier::Bundled, rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intercept, 2.5);
    }
}
