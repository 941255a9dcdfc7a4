//! Environment configuration
//!
//! | Variable              | Default              |
//! |-----------------------|----------------------|
//! | `SUPABASE_URL`        | unset (no remote tier) |
//! | `SUPABASE_ANON_KEY`   | unset                |
//! | `SPECIES_TABLE`       | `species_data`       |
//! | `STATIC_CATALOG_PATH` | `data/species.json`  |
//! | `STATIC_CATALOG_URL`  | unset (use the path) |
//! | `CATALOG_TIMEOUT_SECS`| `5`                  |
//! | `PORT`                | `3000`               |
//! | `CACHE_TTL_SECS`      | `300`                |

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{build_client, CatalogLoader, RemoteTableSource, StaticFileSource};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub species_table: String,
    pub static_catalog_path: PathBuf,
    pub static_catalog_url: Option<String>,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            species_table: "species_data".to_string(),
            static_catalog_path: PathBuf::from("data/species.json"),
            static_catalog_url: None,
            timeout: crate::catalog::DEFAULT_TIMEOUT,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn positive_u64(
    key: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    match non_empty(value) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_secs = positive_u64(
            "CATALOG_TIMEOUT_SECS",
            lookup("CATALOG_TIMEOUT_SECS"),
            defaults.timeout.as_secs(),
        )?;

        Ok(Self {
            supabase_url: non_empty(lookup("SUPABASE_URL")),
            supabase_key: non_empty(lookup("SUPABASE_ANON_KEY")),
            species_table: non_empty(lookup("SPECIES_TABLE")).unwrap_or(defaults.species_table),
            static_catalog_path: non_empty(lookup("STATIC_CATALOG_PATH"))
                .map(PathBuf::from)
                .unwrap_or(defaults.static_catalog_path),
            static_catalog_url: non_empty(lookup("STATIC_CATALOG_URL")),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Remote (if configured), then bundled; defaults are implicit in the loader
    pub fn build_loader(&self) -> CatalogLoader {
        let client = build_client(self.timeout);
        let mut loader = CatalogLoader::new(self.timeout);

        if let Some(url) = &self.supabase_url {
            loader = loader.with_source(RemoteTableSource::new(
                client.clone(),
                url.clone(),
                self.species_table.clone(),
                self.supabase_key.clone(),
            ));
        }

        loader = match &self.static_catalog_url {
            Some(url) => loader.with_source(StaticFileSource::from_url(client, url.clone())),
            None => {
                loader.with_source(StaticFileSource::from_path(self.static_catalog_path.clone()))
            }
        };

        loader
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub catalog: CatalogConfig,
    pub port: u16,
    pub cache_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog = CatalogConfig::from_lookup(&lookup)?;

        let port_raw = lookup("PORT");
        let port = positive_u64("PORT", port_raw.clone(), 3000)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
            key: "PORT",
            value: port_raw.unwrap_or_default(),
        })?;

        let cache_ttl = positive_u64("CACHE_TTL_SECS", lookup("CACHE_TTL_SECS"), 300)?;

        Ok(Self {
            catalog,
            port,
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }
}
