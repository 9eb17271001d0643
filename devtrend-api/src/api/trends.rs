//! Trend endpoints
//!
//! `GET /api/trends/:dimension?items=A&items=B&limit=N`
//! `GET /api/dimensions`

use axum::{
    extract::{Path, Query, State},
    Json,
};
use devtrend_common::trend::{top_items, trends_for_items};
use devtrend_common::{validate_dimension, Dimension, Error, ItemTrend};
use serde::Serialize;
use tracing::debug;

use super::ApiError;
use crate::{AppState, MAX_LIMIT};

/// Trend response body
#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub dimension: String,
    pub items: Vec<ItemTrend>,
}

/// One registry entry
#[derive(Debug, Serialize)]
pub struct DimensionInfo {
    pub dimension: String,
    pub table: String,
}

/// Parsed query string; `items` may repeat
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrendParams {
    pub items: Vec<String>,
    pub limit: Option<u32>,
}

impl TrendParams {
    /// Collect repeated `items` keys and validate `limit` against 1..=MAX_LIMIT
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, Error> {
        let mut params = TrendParams::default();

        for (key, value) in pairs {
            match key.as_str() {
                "items" => {
                    let item = value.trim();
                    if !item.is_empty() {
                        params.items.push(item.to_string());
                    }
                }
                "limit" => {
                    let limit: u32 = value
                        .trim()
                        .parse()
                        .map_err(|_| Error::InvalidInput(format!("limit must be an integer, got '{}'", value)))?;
                    if !(1..=MAX_LIMIT).contains(&limit) {
                        return Err(Error::InvalidInput(format!(
                            "limit must be between 1 and {}, got {}",
                            MAX_LIMIT, limit
                        )));
                    }
                    params.limit = Some(limit);
                }
                _ => {}
            }
        }

        Ok(params)
    }
}

/// GET /api/trends/:dimension
///
/// Explicit `items` are queried directly; otherwise the top `limit` items of
/// the latest year are used. Empty results map to 404.
pub async fn get_trends(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TrendResponse>, ApiError> {
    let dimension = validate_dimension(&dimension)?;
    let params = TrendParams::from_pairs(pairs)?;

    let target_items = if params.items.is_empty() {
        let limit = params.limit.unwrap_or(state.default_limit);
        let top = top_items(&state.db, dimension, limit).await?;
        if top.is_empty() {
            return Err(Error::NotFound(format!("No data found for dimension: {}", dimension)).into());
        }
        top
    } else {
        params.items
    };

    debug!(%dimension, items = ?target_items, "Fetching trends");

    let trends = trends_for_items(&state.db, dimension, &target_items).await?;
    if trends.is_empty() {
        return Err(Error::NotFound(format!(
            "No trend data found for items: [{}]",
            target_items.join(", ")
        ))
        .into());
    }

    Ok(Json(TrendResponse {
        dimension: dimension.key().to_string(),
        items: trends,
    }))
}

/// GET /api/dimensions
pub async fn list_dimensions() -> Json<Vec<DimensionInfo>> {
    Json(
        Dimension::ALL
            .iter()
            .map(|d| DimensionInfo {
                dimension: d.key().to_string(),
                table: d.summary_table().to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_repeated_items_collected_in_order() {
        let params = TrendParams::from_pairs(pairs(&[("items", "Rust"), ("items", "Go"), ("items", " ")])).unwrap();
        assert_eq!(params.items, vec!["Rust".to_string(), "Go".to_string()]);
        assert_eq!(params.limit, None);
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(TrendParams::from_pairs(pairs(&[("limit", "50")])).unwrap().limit, Some(50));
        assert!(TrendParams::from_pairs(pairs(&[("limit", "0")])).is_err());
        assert!(TrendParams::from_pairs(pairs(&[("limit", "51")])).is_err());
        assert!(TrendParams::from_pairs(pairs(&[("limit", "many")])).is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = TrendParams::from_pairs(pairs(&[("sort", "asc")])).unwrap();
        assert_eq!(params, TrendParams::default());
    }
}
