//! Meal Analyzer Status Tool
//!
//! Provides runtime status information about the service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage instructions for AI assistants
pub const ANALYSIS_INSTRUCTIONS: &str = r#"
# Meal Analyzer Instructions

Two ways to identify a meal photo and get its nutrients. Both return the same
result shape: food_name, serving_size, nutrients (calories in kcal; protein,
carbs, fat, fiber, sugar in grams) and confidence (0-1).

## 1. On-device classifier + catalog (`resolve_classification`)

Run your image classifier first, then pass its ranked candidates unchanged:

```json
{"candidates": [{"label": "margherita_pizza", "confidence": 0.81},
                {"label": "lasagna", "confidence": 0.07}]}
```

- Keep the classifier's order. Do not re-sort or filter.
- The first candidate that matches a catalog food wins, with its own confidence.
- If none match, the response names the top label. Do not retry with edited labels.

## 2. Vision model (`analyze_photo_remote`)

Pass an image path. Requires OPENAI_API_KEY on the server.
Optionally pass `fallback_candidates` (same shape as above); they are resolved
against the catalog only if the vision model fails.
Confidence is always 0.85. Failures carry an `error` kind:
remote_rejected, empty_response, malformed_payload, no_subject_detected,
invalid_image, transport.

## Catalog

- `lookup_food`: resolve one label and see which match stage hit.
- `list_catalog`: browse catalog foods, optionally filtered by name.
"#;

/// Service status
#[derive(Debug, Serialize)]
pub struct AnalyzerStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub catalog_source: String,
    pub catalog_entries: usize,
    pub remote_enabled: bool,
    pub remote_model: Option<String>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time and static facts for status reports
pub struct StatusTracker {
    start_time: Instant,
    catalog_source: String,
    catalog_entries: usize,
    remote_model: Option<String>,
}

impl StatusTracker {
    pub fn new(catalog_source: String, catalog_entries: usize, remote_model: Option<String>) -> Self {
        Self {
            start_time: Instant::now(),
            catalog_source,
            catalog_entries,
            remote_model,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> AnalyzerStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        AnalyzerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            catalog_source: self.catalog_source.clone(),
            catalog_entries: self.catalog_entries,
            remote_enabled: self.remote_model.is_some(),
            remote_model: self.remote_model.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_catalog_and_remote() {
        let tracker = StatusTracker::new("bundled".to_string(), 101, Some("gpt-4o".to_string()));
        let status = tracker.get_status();
        assert_eq!(status.catalog_source, "bundled");
        assert_eq!(status.catalog_entries, 101);
        assert!(status.remote_enabled);
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_status_remote_disabled() {
        let tracker = StatusTracker::new("bundled".to_string(), 0, None);
        assert!(!tracker.get_status().remote_enabled);
    }
}
