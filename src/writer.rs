//! Feature property write-back and output serialization
//!
//! Scored hexes are merged into the `properties` of the matching feature of
//! the base geometry collection. Only the computed keys are overwritten; any
//! other property already on the feature survives.

use crate::data::{feature_hex_id, HexId};
use crate::scorer::ScoredHex;
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// JSON number, or null for missing/non-finite values
fn num(value: Option<f64>) -> Value {
    value
        .filter(|v| v.is_finite())
        .map_or(Value::Null, Value::from)
}

/// Property block written onto a feature for one scored hex
pub fn score_properties(scored: &ScoredHex) -> Map<String, Value> {
    let hex = &scored.hex;
    let mut props = Map::new();
    props.insert("hex_id".into(), json!(hex.hex_id));
    props.insert("region".into(), hex.region.clone().map_or(Value::Null, Value::String));
    props.insert("lat".into(), num(hex.lat));
    props.insert("lon".into(), num(hex.lon));
    props.insert("local_temp_c".into(), num(hex.local_temp_c));
    props.insert("elevation_m".into(), num(hex.elevation_m));
    props.insert("temp_cool_score".into(), num(Some(scored.temp_cool_score)));
    props.insert("elev_norm".into(), num(Some(scored.elev_norm)));
    props.insert("dist_to_region".into(), num(hex.dist_to_region_m));
    // Per-hex scores replace the legacy region-level values
    props.insert("profitability".into(), num(scored.profitability_hex));
    props.insert("sustainability".into(), num(scored.sustainability_hex));
    props.insert("dc_score".into(), num(scored.dc_score_hex));
    props.insert("dc_score_smooth".into(), num(scored.dc_score_hex_smooth));
    props.insert("dc_score_temp".into(), num(scored.dc_score_hex));
    props
}

/// Merge scored hexes into feature properties
///
/// The last feature carrying a given hex_id is the one updated. Scored hexes
/// without a feature are dropped. Returns the number of features updated
/// (distinct hex_ids).
pub fn update_features(features: &mut [Value], scored: &[ScoredHex]) -> usize {
    let mut by_hex: FxHashMap<HexId, usize> = FxHashMap::default();
    for (idx, feature) in features.iter().enumerate() {
        if let Some(hex_id) = feature_hex_id(feature) {
            by_hex.insert(hex_id, idx);
        }
    }

    let mut touched: FxHashSet<HexId> = FxHashSet::default();
    let mut dropped = 0usize;

    for s in scored {
        let Some(&idx) = by_hex.get(&s.hex.hex_id) else {
            dropped += 1;
            continue;
        };
        let Value::Object(feature) = &mut features[idx] else {
            continue;
        };

        let props = feature
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if !props.is_object() {
            *props = Value::Object(Map::new());
        }
        if let Value::Object(props) = props {
            for (key, value) in score_properties(s) {
                props.insert(key, value);
            }
        }
        touched.insert(s.hex.hex_id);
    }

    tracing::info!(
        updated = touched.len(),
        without_feature = dropped,
        "Merged scores into feature properties"
    );

    touched.len()
}

/// Build the output FeatureCollection document
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Serialize the document whole and move it into place
///
/// Writes a sibling temporary file first, so a failed run leaves no partial
/// output behind. Parent directories are created as needed.
pub fn write_feature_collection(doc: &Value, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec(doc).with_context(|| "Failed to serialize feature collection")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &bytes)
        .with_context(|| format!("Failed to write temporary output: {:?}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move output into place: {:?}", path))?;

    tracing::debug!(bytes = bytes.len(), "Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HexRecord;
    use crate::scorer::RegionScores;

    fn scored(hex_id: i64, dc: f64) -> ScoredHex {
        ScoredHex {
            hex: HexRecord {
                hex_id,
                lat: Some(1.0),
                lon: Some(2.0),
                local_temp_c: Some(12.0),
                elevation_m: Some(300.0),
                region: Some("A".to_string()),
                dist_to_region_m: None,
            },
            region_scores: RegionScores {
                sustainability: Some(0.5),
                profitability: Some(0.5),
            },
            temp_norm: 0.0,
            temp_cool_score: 1.0,
            elev_norm: 0.0,
            sustainability_hex: Some(0.65),
            profitability_hex: Some(0.5),
            dc_score_hex: Some(dc),
            dc_score_hex_smooth: Some(dc + 0.01),
        }
    }

    #[test]
    fn test_update_preserves_unrelated_properties() {
        let mut features = vec![json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": []},
            "properties": {"hex_id": 5, "name": "keep me", "dc_score": 0.1}
        })];

        let n = update_features(&mut features, &[scored(5, 0.59)]);

        assert_eq!(n, 1);
        let props = &features[0]["properties"];
        assert_eq!(props["name"], "keep me");
        assert_eq!(props["dc_score"], 0.59);
        assert_eq!(props["dc_score_temp"], 0.59);
        assert_eq!(props["dc_score_smooth"], 0.59 + 0.01);
        assert_eq!(props["profitability"], 0.5);
        assert_eq!(props["sustainability"], 0.65);
        assert_eq!(props["region"], "A");
        assert_eq!(props["dist_to_region"], Value::Null);
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn test_unmatched_rows_dropped_and_features_untouched() {
        let original = json!({"properties": {"hex_id": 1, "dc_score": 0.3}});
        let mut features = vec![original.clone()];

        let n = update_features(&mut features, &[scored(2, 0.5)]);

        assert_eq!(n, 0);
        assert_eq!(features[0], original);
    }

    #[test]
    fn test_hex_id_written_as_integer() {
        let mut features = vec![json!({"properties": {"hex_id": "9"}})];

        update_features(&mut features, &[scored(9, 0.5)]);

        assert!(features[0]["properties"]["hex_id"].is_i64());
        assert_eq!(features[0]["properties"]["hex_id"], 9);
    }

    #[test]
    fn test_last_duplicate_feature_is_updated() {
        let mut features = vec![
            json!({"properties": {"hex_id": 3, "tag": "first"}}),
            json!({"properties": {"hex_id": 3, "tag": "second"}}),
        ];

        update_features(&mut features, &[scored(3, 0.5)]);

        assert!(features[0]["properties"].get("dc_score").is_none());
        assert_eq!(features[1]["properties"]["dc_score"], 0.5);
    }

    #[test]
    fn test_non_finite_written_as_null() {
        assert_eq!(num(Some(f64::NAN)), Value::Null);
        assert_eq!(num(Some(f64::INFINITY)), Value::Null);
        assert_eq!(num(None), Value::Null);
        assert_eq!(num(Some(1.5)), json!(1.5));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public/data/out.json");
        let doc = feature_collection(vec![json!({"properties": {"hex_id": 1}})]);

        write_feature_collection(&doc, &path).unwrap();

        let back: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["type"], "FeatureCollection");
        assert_eq!(back["features"].as_array().unwrap().len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
