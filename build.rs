//! Stamps each compile of Meal Analyzer with a build number and UTC time.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn next_build_number(counter: &Path) -> u64 {
    let previous = fs::read_to_string(counter)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    previous + 1
}

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=data/nutrients.json");

    let counter = Path::new(COUNTER_FILE);
    let build = next_build_number(counter);
    if let Err(e) = fs::write(counter, build.to_string()) {
        println!("cargo:warning=could not persist {}: {}", COUNTER_FILE, e);
    }

    let stamped_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=MEAL_ANALYZER_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=MEAL_ANALYZER_BUILD_TIMESTAMP={}", stamped_at);
}
