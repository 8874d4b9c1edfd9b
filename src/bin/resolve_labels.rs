//! Utility to check how classifier labels resolve against the catalog
//! Usage: cargo run --bin resolve_labels -- <label> [label ...]

use meal_analyzer::catalog::{resolve_with_stage, Catalog};
use meal_analyzer::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<String> = std::env::args().skip(1).collect();
    if labels.is_empty() {
        eprintln!("Usage: resolve_labels <label> [label ...]");
        std::process::exit(2);
    }

    let config = Config::from_env()?;
    let catalog = match &config.catalog_path {
        Some(path) => {
            println!("Catalog: {}", path.display());
            Catalog::load(path)?
        }
        None => {
            println!("Catalog: bundled");
            Catalog::bundled()?
        }
    };
    println!("Entries: {}", catalog.len());
    println!();

    for label in &labels {
        match resolve_with_stage(&catalog, label) {
            Some(r) => println!(
                "{:<30} -> {} ({} match, {} kcal per {})",
                label,
                r.entry.name,
                r.stage.as_str(),
                r.entry.nutrients.calories,
                r.entry.serving_size
            ),
            None => println!("{:<30} -> no match", label),
        }
    }

    Ok(())
}
