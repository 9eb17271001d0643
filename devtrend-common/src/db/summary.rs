//! Summary store
//!
//! One table per dimension, keyed by (year, item). Writes replace a whole
//! year at once so rows computed under an older alias table never linger.

use sqlx::SqlitePool;
use tracing::debug;

use super::init::create_summary_table;
use crate::models::{YearSummary, YearlyCount};
use crate::{Dimension, Result};

/// Access to the per-dimension summary tables
#[derive(Debug, Clone)]
pub struct SummaryStore {
    pool: SqlitePool,
}

impl SummaryStore {
    /// Create new store with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the dimension's table if absent
    pub async fn ensure_table(&self, dimension: Dimension) -> Result<()> {
        create_summary_table(&self.pool, dimension).await
    }

    /// Replace every stored row of `summary.year` with the new counts
    ///
    /// Delete and insert run in one transaction: readers see either the old
    /// year or the new one, never a mix.
    pub async fn replace_year(&self, summary: &YearSummary) -> Result<()> {
        let table = summary.dimension.summary_table();
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE year = ?", table))
            .bind(summary.year)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let insert_sql = format!(
            "INSERT INTO {} (year, item, have_count, want_count, base_count) VALUES (?, ?, ?, ?, ?)",
            table
        );
        for row in summary.counts() {
            sqlx::query(&insert_sql)
                .bind(row.year)
                .bind(&row.item)
                .bind(row.have_count)
                .bind(row.want_count)
                .bind(row.base_count)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(
            table,
            year = summary.year,
            deleted,
            inserted = summary.items.len(),
            "Replaced summary year"
        );

        Ok(())
    }

    /// Distinct years present for a dimension, ascending
    pub async fn years(&self, dimension: Dimension) -> Result<Vec<i64>> {
        let years: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT year FROM {} ORDER BY year ASC",
            dimension.summary_table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(years)
    }

    /// Stored rows for one year, ordered by item
    pub async fn rows_for_year(&self, dimension: Dimension, year: i64) -> Result<Vec<YearlyCount>> {
        let rows = sqlx::query_as::<_, YearlyCount>(&format!(
            "SELECT year, item, have_count, want_count, base_count FROM {} WHERE year = ? ORDER BY item ASC",
            dimension.summary_table()
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
