//! Nearest-region assignment
//!
//! Hexes without a region tag are attributed to the region whose centroid is
//! closest by haversine distance. Existing tags are never touched. Regions are
//! few, so a per-hex scan over centroids is enough here.

use crate::data::{HexRecord, RegionRecord};
use crate::utils::{haversine_rad, valid_coords};

/// Region centroid in radians
struct Centroid<'a> {
    name: &'a str,
    phi: f64,
    lambda: f64,
}

/// Untagged hex with usable coordinates
pub fn can_assign(hex: &HexRecord) -> bool {
    hex.region.is_none() && valid_coords(hex.lat, hex.lon).is_some()
}

/// Fill missing region tags with the nearest region centroid
///
/// Records the distance (meters) in `dist_to_region_m` for every hex that was
/// assigned. Hexes with missing coordinates keep a null region and distance.
/// Ties go to the first region in input order. Returns the number of hexes
/// assigned.
pub fn assign_region_if_missing(hexes: &mut [HexRecord], regions: &[RegionRecord]) -> usize {
    if hexes.iter().all(|h| h.region.is_some()) {
        tracing::debug!("All hexes already tagged - region assignment skipped");
        return 0;
    }

    let centroids: Vec<Centroid> = regions
        .iter()
        .filter_map(|r| {
            valid_coords(r.lat, r.lon).map(|(lat, lon)| Centroid {
                name: &r.region,
                phi: lat.to_radians(),
                lambda: lon.to_radians(),
            })
        })
        .collect();

    if centroids.is_empty() {
        tracing::warn!("No region has a centroid - untagged hexes stay untagged");
        return 0;
    }

    let mut assigned = 0;
    let mut no_coords = 0;

    for hex in hexes.iter_mut().filter(|h| h.region.is_none()) {
        let Some((lat, lon)) = valid_coords(hex.lat, hex.lon) else {
            no_coords += 1;
            continue;
        };
        let (phi, lambda) = (lat.to_radians(), lon.to_radians());

        let mut best: Option<(&str, f64)> = None;
        for c in &centroids {
            let d = haversine_rad(phi, lambda, c.phi, c.lambda);
            // Strict less-than keeps the first region on ties
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((c.name, d));
            }
        }

        if let Some((name, d)) = best {
            hex.region = Some(name.to_string());
            hex.dist_to_region_m = Some(d);
            assigned += 1;
        }
    }

    tracing::info!(
        assigned,
        without_coords = no_coords,
        "Assigned nearest regions to untagged hexes"
    );

    assigned
}
