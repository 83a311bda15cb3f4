//! Data Loading and Management
//!
//! Loads the region score table and hex climate table with Polars, and the
//! base geometry collection with serde_json. Coordinates and region tags are
//! taken from the geometry collection (authoritative) and attached to the
//! climate rows.

use crate::config::PipelinePaths;
use crate::error::InputError;
use crate::utils::{f64_values, i64_values, read_csv, require_columns, string_values};
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Stable integer identifier of a hex cell
pub type HexId = i64;

/// Region-level baseline scores
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub region: String,
    /// Centroid latitude (degrees)
    pub lat: Option<f64>,
    /// Centroid longitude (degrees)
    pub lon: Option<f64>,
    pub sustainability: Option<f64>,
    pub profitability: Option<f64>,
}

/// One row of the hex table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HexRecord {
    pub hex_id: HexId,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub local_temp_c: Option<f64>,
    pub elevation_m: Option<f64>,
    /// Region tag (from geometry, or filled by nearest-region assignment)
    pub region: Option<String>,
    /// Only set for hexes whose region was inferred in this run
    pub dist_to_region_m: Option<f64>,
}

/// Coordinates and region tags pulled from feature properties
///
/// Both maps keep the first occurrence of a hex_id.
#[derive(Debug, Default)]
pub struct FeatureTags {
    pub coords: FxHashMap<HexId, (f64, f64)>,
    pub regions: FxHashMap<HexId, String>,
}

/// Main data holder for one pipeline run
pub struct HexData {
    /// Region score table
    pub regions: Vec<RegionRecord>,

    /// Hex climate rows annotated with geometry lat/lon/region
    pub hexes: Vec<HexRecord>,

    /// Features of the base geometry collection (written back later)
    pub features: Vec<Value>,
}

impl HexData {
    /// Load all three inputs and merge geometry tags into the hex table
    pub fn load(paths: &PipelinePaths) -> Result<Self> {
        let regions = Self::load_regions(&paths.scores)?;
        let mut hexes = Self::load_hex_climate(&paths.hex_climate)?;
        let features = Self::load_features(&paths.base_map)?;

        let tags = extract_feature_tags(&features);
        attach_feature_tags(&mut hexes, &tags);

        tracing::info!(
            regions = regions.len(),
            hexes = hexes.len(),
            features = features.len(),
            "Loaded inputs"
        );
        tracing::debug!(
            with_coords = tags.coords.len(),
            with_region = tags.regions.len(),
            "Geometry tags extracted"
        );

        Ok(HexData {
            regions,
            hexes,
            features,
        })
    }

    /// Load region score table from CSV
    pub fn load_regions(path: &Path) -> Result<Vec<RegionRecord>> {
        let df = read_csv(path)?;
        regions_from_frame(&df, &format!("region scores {:?}", path))
    }

    /// Load hex climate table from CSV
    ///
    /// Any `region` column in this table is ignored; geometry tags win.
    pub fn load_hex_climate(path: &Path) -> Result<Vec<HexRecord>> {
        let df = read_csv(path)?;
        hexes_from_frame(&df, &format!("hex climate {:?}", path))
    }

    /// Load the `features` array of the base geometry collection
    pub fn load_features(path: &Path) -> Result<Vec<Value>> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read geometry collection: {:?}", path))?;

        let doc: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse geometry collection JSON: {:?}", path))?;

        features_from_document(doc, &format!("geometry collection {:?}", path))
    }
}

/// Convert a region score frame into records
pub fn regions_from_frame(df: &DataFrame, context: &str) -> Result<Vec<RegionRecord>> {
    require_columns(
        df,
        &["region", "lat", "lon", "sustainability", "profitability"],
        context,
    )?;

    let names = string_values(df, "region", context)?;
    let lats = f64_values(df, "lat", context)?;
    let lons = f64_values(df, "lon", context)?;
    let sustainability = f64_values(df, "sustainability", context)?;
    let profitability = f64_values(df, "profitability", context)?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let Some(region) = names[idx].clone() else {
            tracing::warn!("{}: row {} has no region name, skipped", context, idx);
            continue;
        };
        records.push(RegionRecord {
            region,
            lat: lats[idx],
            lon: lons[idx],
            sustainability: sustainability[idx],
            profitability: profitability[idx],
        });
    }

    Ok(records)
}

/// Convert a hex climate frame into records (lat/lon/region left empty)
pub fn hexes_from_frame(df: &DataFrame, context: &str) -> Result<Vec<HexRecord>> {
    require_columns(df, &["hex_id", "local_temp_c", "elevation_m"], context)?;

    let ids = i64_values(df, "hex_id", context)?;
    let temps = f64_values(df, "local_temp_c", context)?;
    let elevations = f64_values(df, "elevation_m", context)?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let Some(hex_id) = ids[idx] else {
            tracing::warn!("{}: row {} has no hex_id, skipped", context, idx);
            continue;
        };
        records.push(HexRecord {
            hex_id,
            local_temp_c: temps[idx],
            elevation_m: elevations[idx],
            ..Default::default()
        });
    }

    Ok(records)
}

/// Pull the feature list out of a parsed geometry collection
///
/// A document without `features` is an empty collection.
pub fn features_from_document(doc: Value, context: &str) -> Result<Vec<Value>> {
    let Value::Object(mut obj) = doc else {
        return Err(InputError::NotAnObject {
            context: context.to_string(),
        }
        .into());
    };

    match obj.remove("features") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(features)) => Ok(features),
        Some(_) => Err(InputError::FeaturesNotArray {
            context: context.to_string(),
        }
        .into()),
    }
}

/// Read a hex identifier from a JSON value
///
/// Accepts integers, integral floats and numeric strings.
pub fn json_hex_id(value: &Value) -> Option<HexId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| HexId::try_from(u).ok()))
            .or_else(|| n.as_f64().and_then(integral_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<HexId>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

fn integral_f64(x: f64) -> Option<HexId> {
    (x.is_finite() && x.fract() == 0.0 && x.abs() < 9.0e18).then_some(x as HexId)
}

/// `properties.hex_id` of a feature, if usable
pub fn feature_hex_id(feature: &Value) -> Option<HexId> {
    feature
        .get("properties")
        .and_then(|props| props.get("hex_id"))
        .and_then(json_hex_id)
}

fn region_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Extract coordinates and region tags from feature properties
///
/// A feature contributes coordinates only when hex_id, lat and lon are all
/// present, and a region only when hex_id and region are present. First
/// occurrence of a hex_id wins in each map independently.
pub fn extract_feature_tags(features: &[Value]) -> FeatureTags {
    let mut tags = FeatureTags::default();
    let mut unusable = 0usize;

    for feature in features {
        let Some(props) = feature.get("properties").filter(|p| p.is_object()) else {
            unusable += 1;
            continue;
        };
        let Some(hex_id) = props.get("hex_id").and_then(json_hex_id) else {
            unusable += 1;
            continue;
        };

        let lat = props.get("lat").and_then(Value::as_f64);
        let lon = props.get("lon").and_then(Value::as_f64);
        if let (Some(lat), Some(lon)) = (lat, lon) {
            tags.coords.entry(hex_id).or_insert((lat, lon));
        }

        if let Some(region) = props.get("region").and_then(region_label) {
            tags.regions.entry(hex_id).or_insert(region);
        }
    }

    if unusable > 0 {
        tracing::warn!("{} features have no usable properties.hex_id", unusable);
    }

    tags
}

/// Overwrite lat/lon/region of each hex with the geometry-derived values
pub fn attach_feature_tags(hexes: &mut [HexRecord], tags: &FeatureTags) {
    for hex in hexes.iter_mut() {
        let coords = tags.coords.get(&hex.hex_id);
        hex.lat = coords.map(|c| c.0);
        hex.lon = coords.map(|c| c.1);
        hex.region = tags.regions.get(&hex.hex_id).cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_hex_id_forms() {
        assert_eq!(json_hex_id(&json!(42)), Some(42));
        assert_eq!(json_hex_id(&json!(42.0)), Some(42));
        assert_eq!(json_hex_id(&json!("42")), Some(42));
        assert_eq!(json_hex_id(&json!(42.5)), None);
        assert_eq!(json_hex_id(&json!(null)), None);
        assert_eq!(json_hex_id(&json!("abc")), None);
    }

    #[test]
    fn test_extract_feature_tags_first_occurrence_wins() {
        let features = vec![
            json!({"properties": {"hex_id": 1, "lat": 10.0, "lon": 20.0, "region": "North"}}),
            json!({"properties": {"hex_id": 1, "lat": 99.0, "lon": 99.0, "region": "South"}}),
            json!({"properties": {"hex_id": 2, "lat": 5.0, "region": "East"}}),
            json!({"properties": {"hex_id": 3, "lat": 1.0, "lon": 2.0, "region": null}}),
            json!({"properties": null}),
        ];

        let tags = extract_feature_tags(&features);

        assert_eq!(tags.coords.get(&1), Some(&(10.0, 20.0)));
        assert_eq!(tags.regions.get(&1).map(String::as_str), Some("North"));
        // lon missing: region kept, coords not
        assert!(tags.coords.get(&2).is_none());
        assert_eq!(tags.regions.get(&2).map(String::as_str), Some("East"));
        // region null: coords kept, region not
        assert_eq!(tags.coords.get(&3), Some(&(1.0, 2.0)));
        assert!(tags.regions.get(&3).is_none());
    }

    #[test]
    fn test_region_tag_coordinates_independent_of_order() {
        // Region can come from a later duplicate when the first has none
        let features = vec![
            json!({"properties": {"hex_id": 7, "lat": 1.0, "lon": 1.0}}),
            json!({"properties": {"hex_id": 7, "lat": 2.0, "lon": 2.0, "region": "West"}}),
        ];
        let tags = extract_feature_tags(&features);
        assert_eq!(tags.coords.get(&7), Some(&(1.0, 1.0)));
        assert_eq!(tags.regions.get(&7).map(String::as_str), Some("West"));
    }

    #[test]
    fn test_attach_feature_tags_geometry_is_authoritative() {
        let mut hexes = vec![
            HexRecord {
                hex_id: 1,
                region: Some("FromClimateTable".to_string()),
                ..Default::default()
            },
            HexRecord {
                hex_id: 2,
                region: Some("Stale".to_string()),
                ..Default::default()
            },
        ];
        let mut tags = FeatureTags::default();
        tags.coords.insert(1, (3.0, 4.0));
        tags.regions.insert(1, "Geometry".to_string());

        attach_feature_tags(&mut hexes, &tags);

        assert_eq!(hexes[0].lat, Some(3.0));
        assert_eq!(hexes[0].lon, Some(4.0));
        assert_eq!(hexes[0].region.as_deref(), Some("Geometry"));
        assert_eq!(hexes[1].lat, None);
        assert_eq!(hexes[1].region, None);
    }

    #[test]
    fn test_hexes_from_frame() {
        let df = df![
            "hex_id" => &[Some(10i64), None, Some(12)],
            "local_temp_c" => &[Some(15.0), Some(16.0), None],
            "elevation_m" => &[Some(100.0), Some(200.0), Some(300.0)],
            "region" => &["ignored", "ignored", "ignored"],
        ]
        .unwrap();

        let hexes = hexes_from_frame(&df, "test").unwrap();
        assert_eq!(hexes.len(), 2);
        assert_eq!(hexes[0].hex_id, 10);
        assert_eq!(hexes[0].region, None);
        assert_eq!(hexes[1].hex_id, 12);
        assert_eq!(hexes[1].local_temp_c, None);
        assert_eq!(hexes[1].elevation_m, Some(300.0));
    }

    #[test]
    fn test_hexes_from_frame_missing_column() {
        let df = df![
            "hex_id" => &[1i64],
            "local_temp_c" => &[15.0],
        ]
        .unwrap();

        let err = hexes_from_frame(&df, "hex climate").unwrap_err().to_string();
        assert!(err.contains("elevation_m"));
    }

    #[test]
    fn test_regions_from_frame() {
        let df = df![
            "region" => &["A", "B"],
            "lat" => &[0.0, 10.0],
            "lon" => &[0.0, 10.0],
            "sustainability" => &[0.5, 0.8],
            "profitability" => &[0.5, 0.3],
            "population" => &[1_000i64, 2_000],
        ]
        .unwrap();

        let regions = regions_from_frame(&df, "test").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].region, "B");
        assert_eq!(regions[1].sustainability, Some(0.8));
        assert_eq!(regions[1].profitability, Some(0.3));
    }

    #[test]
    fn test_features_from_document() {
        let doc = json!({"type": "FeatureCollection", "features": [{"properties": {"hex_id": 1}}]});
        assert_eq!(features_from_document(doc, "test").unwrap().len(), 1);

        let doc = json!({"type": "FeatureCollection"});
        assert!(features_from_document(doc, "test").unwrap().is_empty());

        assert!(features_from_document(json!({"features": {}}), "test").is_err());
        assert!(features_from_document(json!([1, 2]), "test").is_err());
    }
}
