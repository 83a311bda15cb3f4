//! Pipeline - loader → region assigner → scorer → writer
//!
//! One run is a pure function from the three input files to the output
//! document: nothing is written unless every stage succeeds.

use crate::config::{PipelinePaths, ScoringConfig};
use crate::data::HexData;
use crate::region_assigner::assign_region_if_missing;
use crate::scorer::{HexScorer, ScoredHex};
use crate::writer::{feature_collection, update_features, write_feature_collection};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub output: PathBuf,
    /// Features in the written collection (updated or not)
    pub feature_count: usize,
    /// Features that received scores
    pub updated_features: usize,
    /// Hexes whose region was inferred in this run
    pub regions_assigned: usize,
}

/// Stages 1-3: scored hexes plus the not-yet-updated base features
pub struct ScoredInputs {
    pub scored: Vec<ScoredHex>,
    pub features: Vec<Value>,
    pub regions_assigned: usize,
}

/// Load, assign regions and score, without writing anything
pub fn score_inputs(paths: &PipelinePaths, config: &ScoringConfig) -> Result<ScoredInputs> {
    let data = HexData::load(paths).with_context(|| "Loading inputs")?;
    let HexData {
        regions,
        mut hexes,
        features,
    } = data;

    let regions_assigned = assign_region_if_missing(&mut hexes, &regions);

    let scorer = HexScorer::new(config.clone());
    let scored = scorer.score(hexes, &regions);

    Ok(ScoredInputs {
        scored,
        features,
        regions_assigned,
    })
}

/// Full run: score and write the enriched geometry collection
pub fn run_pipeline(paths: &PipelinePaths, config: &ScoringConfig) -> Result<PipelineSummary> {
    let start = Instant::now();
    config.validate()?;

    let ScoredInputs {
        scored,
        mut features,
        regions_assigned,
    } = score_inputs(paths, config)?;
    let updated_features = update_features(&mut features, &scored);
    let feature_count = features.len();

    let doc = feature_collection(features);
    write_feature_collection(&doc, &paths.output)?;

    tracing::info!(
        features = feature_count,
        updated = updated_features,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Pipeline finished"
    );

    Ok(PipelineSummary {
        output: paths.output.clone(),
        feature_count,
        updated_features,
        regions_assigned,
    })
}
