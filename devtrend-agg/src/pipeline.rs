//! Dimension/year walk over the configured survey layout

use devtrend_common::config::{DimensionConfig, PipelineConfig};
use devtrend_common::db::SummaryStore;
use devtrend_common::source::fetch_raw_rows;
use devtrend_common::trend::aggregate;
use devtrend_common::{Dimension, Result};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Restricts a run to some dimensions and/or years; empty means everything
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub dimensions: BTreeSet<Dimension>,
    pub years: BTreeSet<i64>,
}

impl RunFilter {
    pub fn all() -> Self {
        Self::default()
    }

    fn wants_dimension(&self, dimension: Dimension) -> bool {
        self.dimensions.is_empty() || self.dimensions.contains(&dimension)
    }

    fn wants_year(&self, year: i64) -> bool {
        self.years.is_empty() || self.years.contains(&year)
    }
}

/// What one (dimension, year) replacement wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub dimension: Dimension,
    pub year: i64,
    pub rows_read: usize,
    pub base_count: i64,
    pub items_written: usize,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub years: Vec<YearReport>,
}

impl PipelineReport {
    pub fn items_written(&self) -> usize {
        self.years.iter().map(|y| y.items_written).sum()
    }

    pub fn for_dimension(&self, dimension: Dimension) -> impl Iterator<Item = &YearReport> {
        self.years.iter().filter(move |y| y.dimension == dimension)
    }
}

/// Run every selected dimension and year
///
/// Years are replaced one at a time. If a year fails the error is returned
/// immediately; years already written stay valid and a re-run picks up
/// from scratch.
pub async fn run_pipeline(
    store: &SummaryStore,
    config: &PipelineConfig,
    filter: &RunFilter,
) -> Result<PipelineReport> {
    let mut report = PipelineReport::default();

    for dimension in config.configured_dimensions() {
        if !filter.wants_dimension(dimension) {
            continue;
        }
        let Some(dim_config) = config.dimension(dimension) else {
            continue;
        };

        let separator = config.separator_for(dimension);
        run_dimension(store, dimension, dim_config, separator, filter, &mut report).await?;
    }

    for dimension in &filter.dimensions {
        if config.dimension(*dimension).is_none() {
            warn!("Dimension {} requested but not configured; skipped", dimension);
        }
    }

    info!(
        "Pipeline complete: {} years replaced, {} item rows written",
        report.years.len(),
        report.items_written()
    );

    Ok(report)
}

async fn run_dimension(
    store: &SummaryStore,
    dimension: Dimension,
    dim_config: &DimensionConfig,
    separator: &str,
    filter: &RunFilter,
    report: &mut PipelineReport,
) -> Result<()> {
    let mapping = dim_config.mapping()?;
    store.ensure_table(dimension).await?;

    info!(
        "Processing {} ({} years, {} aliases)",
        dimension.summary_table(),
        dim_config.years.len(),
        mapping.len()
    );

    for selector in dim_config.sorted_years() {
        if !filter.wants_year(selector.year) {
            continue;
        }

        let raw_rows = fetch_raw_rows(store.pool(), selector).await?;
        let summary = aggregate(dimension, selector.year, &raw_rows, &mapping, separator);
        store.replace_year(&summary).await?;

        info!(
            "{} {}: {} rows from {}, base_count {}, {} items",
            dimension,
            selector.year,
            raw_rows.len(),
            selector.source,
            summary.base_count,
            summary.items.len()
        );

        report.years.push(YearReport {
            dimension,
            year: selector.year,
            rows_read: raw_rows.len(),
            base_count: summary.base_count,
            items_written: summary.items.len(),
        });
    }

    Ok(())
}
