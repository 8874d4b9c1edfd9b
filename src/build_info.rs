//! Version and build stamp embedded at compile time by `build.rs`

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("MEAL_ANALYZER_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("MEAL_ANALYZER_BUILD_TIMESTAMP");

/// Build stamp reported by `get_status` and the startup banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// 0 when the build script did not run
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_raw(RAW_BUILD_NUMBER, RAW_BUILD_TIMESTAMP)
    }

    fn from_raw(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.unwrap_or("unknown"),
        }
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Meal Analyzer v{} (build {})", info.version, info.build_number);
    eprintln!("  Built {}", info.build_timestamp);
    eprintln!("===============================================");
}
