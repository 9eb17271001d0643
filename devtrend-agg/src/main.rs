//! devtrend-agg - Rebuild the usage trend summary tables
//!
//! Reads the raw per-year survey tables named in the pipeline config and
//! replaces each (dimension, year) of the summary tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use devtrend_agg::{run_pipeline, RunFilter};
use devtrend_common::config::{resolve_database_path, PipelineConfig};
use devtrend_common::db::{init_database, SummaryStore};
use devtrend_common::validate_dimension;
use tracing::{error, info};

/// Command-line arguments for devtrend-agg
#[derive(Parser, Debug)]
#[command(name = "devtrend-agg")]
#[command(about = "Aggregate yearly survey answers into have/want usage trends")]
#[command(version)]
struct Args {
    /// Pipeline configuration (TOML); the built-in survey layout is used when omitted
    #[arg(short, long, env = "DEVTREND_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database holding the raw survey tables and the summary tables
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Only process these dimensions (repeatable)
    #[arg(long = "dimension", value_name = "KEY")]
    dimensions: Vec<String>,

    /// Only process these survey years (repeatable)
    #[arg(long = "year", value_name = "YEAR")]
    years: Vec<i64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting DevTrend aggregation (devtrend-agg) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = PipelineConfig::load_or_builtin(args.config.as_deref())
        .context("Failed to load pipeline configuration")?;

    if args.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let mut filter = RunFilter::all();
    for name in &args.dimensions {
        filter.dimensions.insert(validate_dimension(name)?);
    }
    filter.years.extend(args.years.iter().copied());

    let db_path = resolve_database_path(args.database.as_deref(), config.database.as_deref());
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let store = SummaryStore::new(pool);

    match run_pipeline(&store, &config, &filter).await {
        Ok(report) => {
            for year in &report.years {
                info!(
                    "  {:<12} {}  rows={:<7} base={:<7} items={}",
                    year.dimension.key(),
                    year.year,
                    year.rows_read,
                    year.base_count,
                    year.items_written
                );
            }
        }
        Err(e) => {
            error!("Aggregation failed: {}", e);
            store.pool().close().await;
            return Err(e.into());
        }
    }

    store.pool().close().await;
    Ok(())
}
