//! Scoring and pipeline configuration
//!
//! All tunable weights of the hex scoring formula live in [`ScoringConfig`] so
//! the formula can be audited (and tested) without hunting for literals.
//! Defaults reproduce the published score map.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Mean Earth radius used by every haversine computation (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Optional tuning file looked up next to the inputs
pub const CONFIG_FILE_NAME: &str = "hex_score_config.json";

/// Weights and knobs for the hex scoring formula
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of `temp_cool_score` in `sustainability_hex`
    pub temp_weight: f64,
    /// Weight of `elev_norm` in `sustainability_hex`
    pub elev_weight: f64,
    /// Weight of `sustainability_hex` in `dc_score_hex`
    pub sustainability_weight: f64,
    /// Weight of `profitability_hex` in `dc_score_hex`
    pub profitability_weight: f64,
    /// Neighbours averaged during smoothing
    pub smooth_k: usize,
    /// Self weight of the smoothing blend (neighbour mean gets the rest)
    pub smooth_blend: f64,
    /// Lower clip quantile for min-max normalization
    pub lower_quantile: f64,
    /// Upper clip quantile for min-max normalization
    pub upper_quantile: f64,
    /// Normalized value used when the input is missing
    pub norm_fallback: f64,
    /// Distance-matrix rows computed per batch during smoothing
    pub smooth_block_rows: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            temp_weight: 0.15,
            elev_weight: 0.05,
            sustainability_weight: 0.6,
            profitability_weight: 0.4,
            smooth_k: 20,
            smooth_blend: 0.25,
            lower_quantile: 0.01,
            upper_quantile: 0.99,
            norm_fallback: 0.5,
            smooth_block_rows: 1024,
        }
    }
}

impl ScoringConfig {
    /// Load config from JSON file (omitted keys keep their defaults)
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config: {:?}", path))?;

        let config: ScoringConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scoring config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `hex_score_config.json` from `root` if present, defaults otherwise
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::info!("Loading scoring config: {:?}", path);
            Self::load(&path)
        } else {
            tracing::info!("Scoring config not found - using built-in weights");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit(self.lower_quantile) || !in_unit(self.upper_quantile) {
            anyhow::bail!(
                "Quantiles must lie in [0, 1] (got lower={}, upper={})",
                self.lower_quantile,
                self.upper_quantile
            );
        }
        if self.lower_quantile > self.upper_quantile {
            anyhow::bail!(
                "Lower quantile {} exceeds upper quantile {}",
                self.lower_quantile,
                self.upper_quantile
            );
        }
        if self.smooth_block_rows == 0 {
            anyhow::bail!("smooth_block_rows must be at least 1");
        }
        Ok(())
    }
}

/// Input and output locations of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePaths {
    /// Region score table (region, lat, lon, sustainability, profitability)
    pub scores: PathBuf,
    /// Hex climate table (hex_id, local_temp_c, elevation_m, ...)
    pub hex_climate: PathBuf,
    /// Base geometry collection carrying hex lat/lon/region
    pub base_map: PathBuf,
    /// Enriched geometry collection
    pub output: PathBuf,
}

impl PipelinePaths {
    /// Fixed project layout under `root`
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            scores: root.join("datacenter_scores_real.csv"),
            hex_climate: root.join("hex_weather_data_all.csv"),
            base_map: root.join("public/data/score_map.json"),
            output: root.join("public/data/score_map_hex.json"),
        }
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::from_root(".")
    }
}
