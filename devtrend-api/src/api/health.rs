//! Health check endpoint

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use devtrend_common::trend::latest_year;
use devtrend_common::Dimension;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response
///
/// `latest_years` lists only dimensions with stored rows, so an empty map
/// means the aggregation pipeline has not been run against this database.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub dimensions: usize,
    pub latest_years: BTreeMap<String, i64>,
}

/// GET /health
///
/// Reports "degraded" rather than failing when a summary table can't be read.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "ok";
    let mut latest_years = BTreeMap::new();

    for dimension in Dimension::ALL {
        match latest_year(&state.db, dimension).await {
            Ok(Some(year)) => {
                latest_years.insert(dimension.key().to_string(), year);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%dimension, "Health check could not read summary table: {}", e);
                status = "degraded";
            }
        }
    }

    Json(HealthResponse {
        status: status.to_string(),
        module: "devtrend-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dimensions: Dimension::ALL.len(),
        latest_years,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
