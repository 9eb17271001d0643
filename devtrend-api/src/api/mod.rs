//! HTTP API handlers for devtrend-api

pub mod error;
pub mod health;
pub mod trends;

pub use error::ApiError;
pub use health::health_routes;
pub use trends::{get_trends, list_dimensions};
