//! Remote species table (PostgREST / Supabase REST endpoint)

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{records_from_rows, CatalogSource, CatalogTier};
use crate::error::CatalogError;
use crate::species::SpeciesRecord;

/// Shared HTTP client for catalog fetches
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub struct RemoteTableSource {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: Option<String>,
}

impl RemoteTableSource {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        table: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            table: table.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// All rows, ordered by name (ordering is cosmetic)
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=*&order=english_name.asc",
            self.base_url, self.table
        )
    }

    fn unavailable(&self, reason: String) -> CatalogError {
        CatalogError::unavailable(CatalogTier::Remote, reason)
    }
}

#[async_trait]
impl CatalogSource for RemoteTableSource {
    fn tier(&self) -> CatalogTier {
        CatalogTier::Remote
    }

    fn describe(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn fetch(&self) -> Result<Vec<SpeciesRecord>, CatalogError> {
        let mut request = self.client.get(self.table_url());
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("query returned HTTP {status}")));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid response body: {e}")))?;

        Ok(records_from_rows(CatalogTier::Remote, rows))
    }
}
