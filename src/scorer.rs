//! Hex Scorer - joins region scores onto hexes and computes composite scores
//!
//! Per hex:
//! - `temp_norm`          = clipped min-max of `local_temp_c` (missing → fallback)
//! - `temp_cool_score`    = 1 − temp_norm
//! - `elev_norm`          = clipped min-max of `elevation_m`
//! - `sustainability_hex` = region sustainability + temp_weight × temp_cool_score
//!                          + elev_weight × elev_norm
//! - `profitability_hex`  = region profitability
//! - `dc_score_hex`       = sustainability_weight × sustainability_hex
//!                          + profitability_weight × profitability_hex
//!
//! followed by k-NN smoothing of `dc_score_hex` (see [`crate::smoothing`]).

use crate::config::ScoringConfig;
use crate::data::{HexRecord, RegionRecord};
use crate::smoothing::{knn_smooth, SmoothingParams};
use crate::utils::minmax_clamped;
use rustc_hash::FxHashMap;

/// Region-level fields after the join (all null when unmatched)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionScores {
    pub sustainability: Option<f64>,
    pub profitability: Option<f64>,
}

/// Hex with joined region fields and all derived scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHex {
    pub hex: HexRecord,
    pub region_scores: RegionScores,
    pub temp_norm: f64,
    pub temp_cool_score: f64,
    pub elev_norm: f64,
    pub sustainability_hex: Option<f64>,
    pub profitability_hex: Option<f64>,
    pub dc_score_hex: Option<f64>,
    pub dc_score_hex_smooth: Option<f64>,
}

/// Main hex scorer
pub struct HexScorer {
    config: ScoringConfig,
}

impl HexScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Join region scores, compute per-hex scores and smooth them
    pub fn score(&self, hexes: Vec<HexRecord>, regions: &[RegionRecord]) -> Vec<ScoredHex> {
        let joined = join_region_scores(hexes, regions);
        let mut scored = self.compute_hex_scores(joined);
        self.smooth(&mut scored);

        tracing::info!(
            hexes = scored.len(),
            scored = scored.iter().filter(|s| s.dc_score_hex.is_some()).count(),
            "Computed hex scores"
        );
        scored
    }

    /// Normalization and weighted scores (no smoothing yet)
    ///
    /// `dc_score_hex_smooth` is initialised to the raw score.
    pub fn compute_hex_scores(&self, joined: Vec<(HexRecord, RegionScores)>) -> Vec<ScoredHex> {
        let cfg = &self.config;

        let temps: Vec<Option<f64>> = joined.iter().map(|(h, _)| h.local_temp_c).collect();
        let elevations: Vec<Option<f64>> = joined.iter().map(|(h, _)| h.elevation_m).collect();

        let temp_norm = minmax_clamped(&temps, cfg.lower_quantile, cfg.upper_quantile, cfg.norm_fallback);
        let elev_norm =
            minmax_clamped(&elevations, cfg.lower_quantile, cfg.upper_quantile, cfg.norm_fallback);

        joined
            .into_iter()
            .zip(temp_norm.into_iter().zip(elev_norm))
            .map(|((hex, region_scores), (temp_norm, elev_norm))| {
                let temp_cool_score = 1.0 - temp_norm;
                let sustainability_hex = region_scores.sustainability.map(|s| {
                    s + temp_cool_score * cfg.temp_weight + elev_norm * cfg.elev_weight
                });
                let profitability_hex = region_scores.profitability;
                let dc_score_hex = match (sustainability_hex, profitability_hex) {
                    (Some(s), Some(p)) => {
                        Some(cfg.sustainability_weight * s + cfg.profitability_weight * p)
                    }
                    _ => None,
                };

                ScoredHex {
                    hex,
                    region_scores,
                    temp_norm,
                    temp_cool_score,
                    elev_norm,
                    sustainability_hex,
                    profitability_hex,
                    dc_score_hex,
                    dc_score_hex_smooth: dc_score_hex,
                }
            })
            .collect()
    }

    /// k-NN smoothing of `dc_score_hex` into `dc_score_hex_smooth`
    pub fn smooth(&self, scored: &mut [ScoredHex]) {
        let coords: Vec<(Option<f64>, Option<f64>)> =
            scored.iter().map(|s| (s.hex.lat, s.hex.lon)).collect();
        let values: Vec<Option<f64>> = scored.iter().map(|s| s.dc_score_hex).collect();

        let smoothed = knn_smooth(
            &coords,
            &values,
            SmoothingParams {
                k: self.config.smooth_k,
                self_weight: self.config.smooth_blend,
                block_rows: self.config.smooth_block_rows,
            },
        );

        for (s, value) in scored.iter_mut().zip(smoothed) {
            s.dc_score_hex_smooth = value;
        }
    }
}

/// Left join of hexes onto regions by region name
///
/// Hexes with a null or unknown region get null region fields. Duplicate
/// region names keep their first row.
pub fn join_region_scores(
    hexes: Vec<HexRecord>,
    regions: &[RegionRecord],
) -> Vec<(HexRecord, RegionScores)> {
    let mut lookup: FxHashMap<&str, RegionScores> = FxHashMap::default();
    for r in regions {
        if lookup.contains_key(r.region.as_str()) {
            tracing::warn!("Duplicate region '{}' in score table - first row kept", r.region);
            continue;
        }
        lookup.insert(
            r.region.as_str(),
            RegionScores {
                sustainability: r.sustainability,
                profitability: r.profitability,
            },
        );
    }

    let mut unmatched = 0usize;
    let joined: Vec<(HexRecord, RegionScores)> = hexes
        .into_iter()
        .map(|hex| {
            let scores = hex
                .region
                .as_deref()
                .and_then(|name| lookup.get(name).copied());
            if scores.is_none() {
                unmatched += 1;
            }
            (hex, scores.unwrap_or_default())
        })
        .collect();

    if unmatched > 0 {
        tracing::debug!(unmatched, "Hexes without a matching region row");
    }

    joined
}
