//! Inspect the three pipeline inputs without writing anything
//!
//! Prints row counts, coordinate/region coverage and missing-value counts so
//! a bad input file shows up before a full run.
//!
//! Usage:
//!   cargo run --bin inspect_hex_inputs

use hex_scorer_rust::data::{attach_feature_tags, extract_feature_tags, feature_hex_id, HexData};
use hex_scorer_rust::{can_assign, PipelinePaths};
use rustc_hash::FxHashSet;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let paths = PipelinePaths::default();

    println!("\n{}", "=".repeat(70));
    println!("Hex Scorer Input Inspection");
    println!("{}", "=".repeat(70));

    let regions = HexData::load_regions(&paths.scores)?;
    println!("\nRegion scores: {:?}", paths.scores);
    println!("  Regions: {}", regions.len());
    println!(
        "  Missing centroid: {}",
        regions.iter().filter(|r| r.lat.is_none() || r.lon.is_none()).count()
    );
    println!(
        "  Missing sustainability: {}",
        regions.iter().filter(|r| r.sustainability.is_none()).count()
    );
    println!(
        "  Missing profitability: {}",
        regions.iter().filter(|r| r.profitability.is_none()).count()
    );
    let distinct: FxHashSet<&str> = regions.iter().map(|r| r.region.as_str()).collect();
    if distinct.len() != regions.len() {
        println!("  WARNING: {} duplicate region names", regions.len() - distinct.len());
    }

    let mut hexes = HexData::load_hex_climate(&paths.hex_climate)?;
    println!("\nHex climate: {:?}", paths.hex_climate);
    println!("  Hexes: {}", hexes.len());
    println!(
        "  Missing local_temp_c: {}",
        hexes.iter().filter(|h| h.local_temp_c.is_none()).count()
    );
    println!(
        "  Missing elevation_m: {}",
        hexes.iter().filter(|h| h.elevation_m.is_none()).count()
    );

    let features = HexData::load_features(&paths.base_map)?;
    let tags = extract_feature_tags(&features);
    println!("\nBase map: {:?}", paths.base_map);
    println!("  Features: {}", features.len());
    println!("  With lat/lon: {}", tags.coords.len());
    println!("  With region: {}", tags.regions.len());

    let feature_ids: FxHashSet<i64> = features.iter().filter_map(feature_hex_id).collect();
    let common = hexes
        .iter()
        .filter(|h| feature_ids.contains(&h.hex_id))
        .map(|h| h.hex_id)
        .collect::<FxHashSet<_>>()
        .len();
    attach_feature_tags(&mut hexes, &tags);
    let untagged = hexes.iter().filter(|h| h.region.is_none()).count();
    let assignable = hexes.iter().filter(|h| can_assign(h)).count();
    println!("\nJoin coverage:");
    println!("  Hexes present in base map (features to update): {}", common);
    println!("  Untagged hexes: {}", untagged);
    println!("  Untagged hexes with lat/lon (assignable): {}", assignable);

    println!("\n{}", "=".repeat(70));
    Ok(())
}
