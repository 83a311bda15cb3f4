//! Great-circle distance helpers

use crate::config::EARTH_RADIUS_M;

/// Haversine distance in meters between two (lat, lon) points in degrees
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_rad(
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    )
}

/// Haversine distance in meters for coordinates already in radians
#[inline]
pub fn haversine_rad(phi1: f64, lambda1: f64, phi2: f64, lambda2: f64) -> f64 {
    let dphi = phi2 - phi1;
    let dlambda = lambda2 - lambda1;
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Both coordinates present and finite
pub fn valid_coords(lat: Option<f64>, lon: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_distance() {
        assert_relative_eq!(haversine_m(12.5, -70.0, 12.5, -70.0), 0.0);
    }

    #[test]
    fn test_one_degree_on_equator() {
        // 2πR / 360
        let expected = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M / 360.0;
        assert_relative_eq!(haversine_m(0.0, 0.0, 0.0, 1.0), expected, epsilon = 1e-6);
        assert_relative_eq!(haversine_m(0.0, 0.0, 1.0, 0.0), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_antipodes() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert_relative_eq!(haversine_m(0.0, 0.0, 0.0, 180.0), half_circumference, epsilon = 1e-3);
    }

    #[test]
    fn test_near_antipodes_stay_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        for &(lat, lon) in &[(-79.1189, -170.0), (33.3, 44.4), (-0.5, 179.9)] {
            let d = haversine_m(lat, lon, -lat, lon + 180.0);
            assert!(d.is_finite());
            assert_relative_eq!(d, half_circumference, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_symmetric() {
        let a = haversine_m(51.5, -0.12, 48.85, 2.35);
        let b = haversine_m(48.85, 2.35, 51.5, -0.12);
        assert_relative_eq!(a, b, epsilon = 1e-9);
        // London - Paris is roughly 344 km
        assert!((340_000.0..350_000.0).contains(&a));
    }

    #[test]
    fn test_valid_coords() {
        assert_eq!(valid_coords(Some(1.0), Some(2.0)), Some((1.0, 2.0)));
        assert_eq!(valid_coords(None, Some(2.0)), None);
        assert_eq!(valid_coords(Some(f64::NAN), Some(2.0)), None);
    }
}
