//! Utility modules for hex scoring
//!
//! Contains shared functionality used across pipeline stages:
//! - Normalization: percentile-clipped min-max scaling
//! - Geo: haversine distances
//! - Frame helpers: CSV reading and column extraction with validation

pub mod normalization;
pub mod geo;
pub mod frame_helpers;

// Re-export commonly used functions
pub use normalization::{minmax_clamped, quantile_linear};
pub use geo::{haversine_m, haversine_rad, valid_coords};
pub use frame_helpers::{read_csv, require_columns, f64_values, i64_values, string_values};
