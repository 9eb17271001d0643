//! Trend queries over the summary tables
//!
//! Read-only; every call is an independent bounded read followed by
//! in-memory grouping.

use sqlx::SqlitePool;
use tracing::debug;

use crate::models::{ItemTrend, YearPoint, YearlyCount};
use crate::{Dimension, Result};

/// Most recent year with any stored row
pub async fn latest_year(pool: &SqlitePool, dimension: Dimension) -> Result<Option<i64>> {
    let year: Option<i64> = sqlx::query_scalar(&format!("SELECT MAX(year) FROM {}", dimension.summary_table()))
        .fetch_one(pool)
        .await?;

    Ok(year)
}

/// Items ranked by `have_count` in the dimension's most recent year
///
/// Ties break on item name ascending. An empty table yields an empty list.
pub async fn top_items(pool: &SqlitePool, dimension: Dimension, limit: u32) -> Result<Vec<String>> {
    let table = dimension.summary_table();

    let Some(latest) = latest_year(pool, dimension).await? else {
        debug!(table, "No summary rows; no top items");
        return Ok(Vec::new());
    };

    let items: Vec<String> = sqlx::query_scalar(&format!(
        r#"
        SELECT item
        FROM {}
        WHERE year = ?
        ORDER BY have_count DESC, item ASC
        LIMIT ?
        "#,
        table
    ))
    .bind(latest)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    debug!(table, latest, count = items.len(), "Selected top items");

    Ok(items)
}

/// Per-item time series for the requested items
///
/// Output is ordered by item ascending, each series by year ascending.
/// Items with no stored rows are left out rather than returned empty.
pub async fn trends_for_items(
    pool: &SqlitePool,
    dimension: Dimension,
    items: &[String],
) -> Result<Vec<ItemTrend>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; items.len()].join(",");
    let sql = format!(
        r#"
        SELECT year, item, have_count, want_count, base_count
        FROM {}
        WHERE item IN ({})
        ORDER BY item ASC, year ASC
        "#,
        dimension.summary_table(),
        placeholders
    );

    let mut query = sqlx::query_as::<_, YearlyCount>(&sql);
    for item in items {
        query = query.bind(item);
    }
    let rows = query.fetch_all(pool).await?;

    Ok(group_into_trends(rows))
}

/// Group rows already sorted by (item, year) into trends
pub fn group_into_trends(rows: Vec<YearlyCount>) -> Vec<ItemTrend> {
    let mut trends: Vec<ItemTrend> = Vec::new();

    for row in rows {
        let point = YearPoint::from(&row);
        match trends.last_mut() {
            Some(trend) if trend.item == row.item => trend.points.push(point),
            _ => trends.push(ItemTrend {
                item: row.item,
                points: vec![point],
            }),
        }
    }

    trends
}
