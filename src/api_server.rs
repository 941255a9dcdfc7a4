// Axum API server module
//
// Purpose: species lookup, search and length-to-weight estimates over HTTP
// The catalog is loaded once at startup and shared read-only.

#[cfg(feature = "api")]
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

#[cfg(feature = "api")]
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use moka::future::Cache;

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use std::time::Duration;

#[cfg(feature = "api")]
use crate::catalog::{Catalog, CatalogTier, LoadedCatalog};

#[cfg(feature = "api")]
use crate::error::EstimateError;

#[cfg(feature = "api")]
use crate::estimator::{estimate_weight, parse_length_cm};

#[cfg(feature = "api")]
use crate::species::SpeciesRecord;

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub tier: CatalogTier,
    pub cache: Cache<String, serde_json::Value>,
}

#[cfg(feature = "api")]
impl AppState {
    pub fn new(loaded: LoadedCatalog, cache_ttl: Duration) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            catalog: Arc::new(loaded.catalog),
            tier: loaded.tier,
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/species", get(list_species))
        .route("/api/species/search", get(search_species))
        .route("/api/species/:name", get(get_species))
        .route("/api/species/:name/weight", get(get_weight))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "tier": state.tier,
        "species": state.catalog.len(),
    }))
}

#[cfg(feature = "api")]
fn species_json(record: &SpeciesRecord) -> serde_json::Value {
    serde_json::json!({
        "english_name": record.english_name,
        "display_name": record.display_name(),
        "afrikaans_name": record.afrikaans_name,
        "scientific_name": record.scientific_name,
        "slope": finite_or_null(record.slope),
        "intercept": finite_or_null(record.intercept),
        "image_ref": record.image_ref,
        "distribution_map_ref": record.distribution_map_ref,
        "regulations": record.regulations,
    })
}

#[cfg(feature = "api")]
fn finite_or_null(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(feature = "api")]
async fn list_species(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cache_key = "species:all".to_string();

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for species list");
        return Json(cached);
    }

    let data: Vec<serde_json::Value> = state.catalog.iter().map(species_json).collect();
    let result = serde_json::json!({
        "rows": data.len(),
        "tier": state.tier,
        "data": data,
    });

    state.cache.insert(cache_key, result.clone()).await;
    Json(result)
}

#[cfg(feature = "api")]
#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[cfg(feature = "api")]
async fn search_species(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(20).min(100);
    let query = params.q.as_deref().unwrap_or("");

    let start = std::time::Instant::now();
    let results = state.catalog.search_limited(query, limit);
    tracing::debug!(
        "Search '{}' returned {} results in {:?}",
        query,
        results.len(),
        start.elapsed()
    );

    let data: Vec<serde_json::Value> = results.into_iter().map(species_json).collect();
    Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
    }))
}

#[cfg(feature = "api")]
async fn get_species(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = state
        .catalog
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Species {} not found", name)))?;

    Ok(Json(species_json(record)))
}

#[cfg(feature = "api")]
#[derive(Debug, Default, serde::Deserialize)]
pub struct WeightParams {
    pub length_cm: Option<String>,
}

#[cfg(feature = "api")]
async fn get_weight(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<WeightParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = state
        .catalog
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Species {} not found", name)))?;

    let raw_length = params
        .length_cm
        .ok_or_else(|| AppError::BadRequest("length_cm is required".to_string()))?;
    let length_cm = parse_length_cm(&raw_length).map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Degenerate coefficients: no result rather than an error
    let estimate = match estimate_weight(record, length_cm) {
        Ok(estimate) => Some(estimate),
        Err(e @ EstimateError::InvalidCalculation { .. }) => {
            tracing::warn!("{}: {}", record.english_name, e);
            None
        }
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };

    Ok(Json(serde_json::json!({
        "species": record.english_name,
        "length_cm": length_cm,
        "weight_kg": estimate.map(|e| e.weight_kg),
        "weight_display": estimate.map(|e| e.to_string()),
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
