//! Hex Scorer Rust Implementation
//!
//! Data-center suitability scores for hexagonal map cells, built from
//! regional sustainability/profitability scores plus per-hex climate and
//! elevation, then spatially smoothed over nearest neighbours.
//!
//! Pipeline stages:
//! - `data`: load region scores, hex climate and base geometry (Polars + serde_json)
//! - `region_assigner`: fill missing region tags from the nearest centroid
//! - `scorer` / `smoothing`: per-hex scores and k-NN smoothing
//! - `writer`: merge scores into feature properties and write the collection
//! - `pipeline`: chains the stages

pub mod config;
pub mod error;
pub mod utils;
pub mod data;
pub mod region_assigner;
pub mod smoothing;
pub mod scorer;
pub mod writer;
pub mod pipeline;

// Re-export commonly used types
pub use config::{PipelinePaths, ScoringConfig, EARTH_RADIUS_M};
pub use data::{HexData, HexId, HexRecord, RegionRecord};
pub use error::InputError;
pub use pipeline::{run_pipeline, score_inputs, PipelineSummary, ScoredInputs};
pub use region_assigner::{assign_region_if_missing, can_assign};
pub use scorer::{HexScorer, RegionScores, ScoredHex};
pub use smoothing::{knn_smooth, SmoothingParams};
pub use utils::{haversine_m, minmax_clamped};
