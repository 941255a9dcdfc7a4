// Catalog inspector
//
// Usage: cargo run --bin inspect_catalog [query] [length_cm]
// Loads the catalog with the environment config, reports which tier won,
// then optionally searches and estimates weights for the hits.

use anyhow::Context;
use catch_estimator_rust::estimator::{estimate_weight, parse_length_cm};
use catch_estimator_rust::logging::{init_tracing, DEFAULT_FILTER};
use catch_estimator_rust::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_FILTER);

    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_default();
    let length = args
        .next()
        .map(|raw| parse_length_cm(&raw))
        .transpose()
        .context("Invalid length argument")?;

    let config = CatalogConfig::from_env().context("Invalid catalog configuration")?;
    let loaded = config.build_loader().load().await;
    let catalog = &loaded.catalog;

    println!("\n=== SPECIES CATALOG ===\n");
    println!("Tier: {}", loaded.tier);
    for skipped in &loaded.skipped {
        println!("  skipped: {}", skipped);
    }
    println!("Species: {}", catalog.len());
    let broken = catalog
        .records()
        .iter()
        .filter(|r| !r.has_finite_coefficients())
        .count();
    println!("Records with non-finite coefficients: {}", broken);

    let hits = catalog.search(&query);
    println!("\nSearch '{}': {} matches", query, hits.len());

    for record in hits {
        match length {
            Some(length_cm) => match estimate_weight(record, length_cm) {
                Ok(estimate) => println!("  {:<40} {} cm -> {}", record, length_cm, estimate),
                Err(e) => println!("  {:<40} {} cm -> no result ({})", record, length_cm, e),
            },
            None => println!("  {}", record),
        }
    }

    Ok(())
}
