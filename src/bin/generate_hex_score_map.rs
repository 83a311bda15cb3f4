//! Build the per-hex FeatureCollection with refreshed data-center scores
//!
//! Reads (relative to the working directory):
//! - datacenter_scores_real.csv
//! - hex_weather_data_all.csv
//! - public/data/score_map.json (geometry + lat/lon + existing region tags)
//!
//! Writes public/data/score_map_hex.json
//!
//! Usage:
//!   cargo run --release --bin generate_hex_score_map

use hex_scorer_rust::{run_pipeline, PipelinePaths, ScoringConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let root = Path::new(".");
    let config = ScoringConfig::load_or_default(root)?;
    let paths = PipelinePaths::from_root(root);

    let summary = run_pipeline(&paths, &config)?;

    println!(
        "Wrote {} with {} features",
        summary.output.display(),
        summary.feature_count
    );

    Ok(())
}
