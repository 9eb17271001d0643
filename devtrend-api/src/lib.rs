//! devtrend-api library - usage trend serving boundary
//!
//! Read-only HTTP access to the per-dimension summary tables built by
//! devtrend-agg.

use axum::http::HeaderValue;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;

/// Default number of items returned when the caller names none
pub const DEFAULT_LIMIT: u32 = 5;

/// Upper bound accepted for `limit`
pub const MAX_LIMIT: u32 = 50;

/// Frontend origins allowed by default (local dev server)
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    /// Item count used when the request has no `items` and no `limit`
    pub default_limit: u32,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.clamp(1, MAX_LIMIT);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/dimensions", get(api::list_dimensions))
        .route("/api/trends/:dimension", get(api::get_trends));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the given frontend origins; unparsable origins are skipped
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
