//! k-nearest-neighbour spatial smoothing
//!
//! Each hex with valid coordinates is blended with the mean score of its k
//! nearest valid neighbours:
//!
//! ```text
//! smooth = w × own + (1 − w) × mean(neighbours)
//! ```
//!
//! Distances come from a dense `n × n` haversine matrix built block by block
//! (`block_rows` rows at a time), so the work is a batched matrix computation
//! while memory stays at `block_rows × n`. The diagonal is infinite: a hex
//! never neighbours itself.

use crate::config::EARTH_RADIUS_M;
use crate::utils::valid_coords;

/// Smoothing parameters
#[derive(Debug, Clone, Copy)]
pub struct SmoothingParams {
    /// Neighbours per hex (capped at `valid − 1`, floored at 1)
    pub k: usize,
    /// Self weight `w` of the blend
    pub self_weight: f64,
    /// Distance-matrix rows per batch
    pub block_rows: usize,
}

/// Valid hex positions in radians, structure-of-arrays layout
struct RadianCoords {
    phi: Vec<f64>,
    lambda: Vec<f64>,
    cos_phi: Vec<f64>,
}

impl RadianCoords {
    fn new(coords: &[(f64, f64)]) -> Self {
        let phi: Vec<f64> = coords.iter().map(|c| c.0.to_radians()).collect();
        let lambda = coords.iter().map(|c| c.1.to_radians()).collect();
        let cos_phi = phi.iter().map(|p| p.cos()).collect();
        Self { phi, lambda, cos_phi }
    }

    fn len(&self) -> usize {
        self.phi.len()
    }

    /// Fill `out` (row-major, `rows.len() × n`) with pairwise distances
    fn distance_block(&self, rows: std::ops::Range<usize>, out: &mut Vec<f64>) {
        let n = self.len();
        out.clear();
        out.resize(rows.len() * n, 0.0);

        for (r, i) in rows.enumerate() {
            let row = &mut out[r * n..(r + 1) * n];
            let (phi_i, lambda_i, cos_i) = (self.phi[i], self.lambda[i], self.cos_phi[i]);
            for (j, d) in row.iter_mut().enumerate() {
                let half_dphi = ((self.phi[j] - phi_i) / 2.0).sin();
                let half_dlambda = ((self.lambda[j] - lambda_i) / 2.0).sin();
                let a = (half_dphi * half_dphi + cos_i * self.cos_phi[j] * half_dlambda * half_dlambda)
                    .clamp(0.0, 1.0);
                *d = 2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt());
            }
            row[i] = f64::INFINITY;
        }
    }
}

/// Smooth `values` over the k nearest neighbours of each hex
///
/// `coords` and `values` are parallel. Hexes with missing coordinates are
/// excluded from the neighbour pool and keep their own value. With fewer than
/// two valid hexes the input is returned unchanged. A missing score among
/// the blended values yields a missing result.
pub fn knn_smooth(
    coords: &[(Option<f64>, Option<f64>)],
    values: &[Option<f64>],
    params: SmoothingParams,
) -> Vec<Option<f64>> {
    debug_assert_eq!(coords.len(), values.len());
    let mut smoothed = values.to_vec();

    let (valid_idx, valid_coords_list): (Vec<usize>, Vec<(f64, f64)>) = coords
        .iter()
        .enumerate()
        .filter_map(|(i, &(lat, lon))| valid_coords(lat, lon).map(|c| (i, c)))
        .unzip();

    let n = valid_idx.len();
    if n < 2 {
        tracing::debug!(valid = n, "Too few located hexes - smoothing skipped");
        return smoothed;
    }

    let k_eff = params.k.min(n - 1).max(1);
    let block_rows = params.block_rows.max(1);
    let positions = RadianCoords::new(&valid_coords_list);

    // Missing scores propagate as NaN through the mean, like an array mean would
    let vals: Vec<f64> = valid_idx
        .iter()
        .map(|&i| values[i].unwrap_or(f64::NAN))
        .collect();

    let mut block = Vec::new();
    let mut order: Vec<usize> = Vec::with_capacity(n);

    for start in (0..n).step_by(block_rows) {
        let end = (start + block_rows).min(n);
        positions.distance_block(start..end, &mut block);

        for (r, i) in (start..end).enumerate() {
            let row = &block[r * n..(r + 1) * n];

            order.clear();
            order.extend(0..n);
            order.select_nth_unstable_by(k_eff - 1, |&a, &b| row[a].total_cmp(&row[b]));

            let neighbour_mean =
                order[..k_eff].iter().map(|&j| vals[j]).sum::<f64>() / k_eff as f64;
            let blended =
                params.self_weight * vals[i] + (1.0 - params.self_weight) * neighbour_mean;

            smoothed[valid_idx[i]] = Some(blended).filter(|v| !v.is_nan());
        }
    }

    tracing::debug!(valid = n, k = k_eff, "Smoothed located hexes");
    smoothed
}
