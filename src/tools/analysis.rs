//! Analysis MCP Tools
//!
//! Entry points for both analysis pathways.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::analysis::{AnalysisError, Analyzer, FallbackAnalyzer, LocalAnalyzer, PrecomputedCandidates};
use crate::catalog::Catalog;
use crate::models::{Candidate, UnifiedResult};

/// Largest photo `analyze_photo` will read (20 MiB)
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Response when analysis could not produce a result
#[derive(Debug, Serialize)]
pub struct AnalysisFailureResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl From<AnalysisError> for AnalysisFailureResponse {
    fn from(err: AnalysisError) -> Self {
        Self {
            success: false,
            error: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Response for a successful analysis
#[derive(Debug, Serialize)]
pub struct AnalysisSuccessResponse {
    pub success: bool,
    pub result: UnifiedResult,
}

impl From<UnifiedResult> for AnalysisSuccessResponse {
    fn from(result: UnifiedResult) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

pub type AnalysisOutcome = Result<AnalysisSuccessResponse, AnalysisFailureResponse>;

fn validate_candidates(candidates: &[Candidate]) -> Result<(), String> {
    for candidate in candidates {
        if candidate.label.trim().is_empty() {
            return Err("candidate label cannot be empty".to_string());
        }
        if !candidate.has_valid_confidence() {
            return Err(format!(
                "confidence for '{}' must be between 0 and 1, got {}",
                candidate.label, candidate.confidence
            ));
        }
    }
    Ok(())
}

/// Local analyzer replaying candidates the client's classifier produced
///
/// Every candidate is kept; the client already chose how many to send.
pub fn client_classified(
    catalog: Arc<Catalog>,
    candidates: Vec<Candidate>,
) -> Result<LocalAnalyzer<PrecomputedCandidates>, String> {
    validate_candidates(&candidates)?;
    let count = candidates.len();
    Ok(LocalAnalyzer::new(catalog, PrecomputedCandidates::new(candidates)).with_max_results(count))
}

/// Resolve classifier candidates (computed by the caller) against the catalog
///
/// Outer error: invalid input. Inner error: no candidate resolved.
pub async fn resolve_classification(
    catalog: Arc<Catalog>,
    candidates: Vec<Candidate>,
) -> Result<AnalysisOutcome, String> {
    let analyzer = client_classified(catalog, candidates)?;

    // Classification already happened client-side; the source ignores the bytes
    Ok(analyzer
        .analyze(&[])
        .await
        .map(AnalysisSuccessResponse::from)
        .map_err(AnalysisFailureResponse::from))
}

/// Remote analyzer, optionally backed by client-side candidates
///
/// With candidates, a remote failure falls back to resolving them locally.
pub fn remote_with_fallback(
    remote: Arc<dyn Analyzer>,
    catalog: Arc<Catalog>,
    fallback_candidates: Option<Vec<Candidate>>,
) -> Result<Arc<dyn Analyzer>, String> {
    match fallback_candidates {
        Some(candidates) if !candidates.is_empty() => {
            let local: Arc<dyn Analyzer> = Arc::new(client_classified(catalog, candidates)?);
            Ok(Arc::new(FallbackAnalyzer::new(remote, local)))
        }
        _ => Ok(remote),
    }
}

/// Read a regular file of at most `max_bytes`
async fn read_image(image_path: &Path, max_bytes: u64) -> Result<Vec<u8>, String> {
    let file = tokio::fs::File::open(image_path)
        .await
        .map_err(|e| format!("Failed to read image {}: {}", image_path.display(), e))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| format!("Failed to read image {}: {}", image_path.display(), e))?;

    if !metadata.is_file() {
        return Err(format!("{} is not a regular file", image_path.display()));
    }
    if metadata.len() > max_bytes {
        return Err(format!(
            "Image {} is {} bytes, limit is {}",
            image_path.display(),
            metadata.len(),
            max_bytes
        ));
    }

    // The file may grow after the size check
    let mut image = Vec::with_capacity(metadata.len() as usize);
    file.take(max_bytes + 1)
        .read_to_end(&mut image)
        .await
        .map_err(|e| format!("Failed to read image {}: {}", image_path.display(), e))?;
    if image.len() as u64 > max_bytes {
        return Err(format!("Image {} exceeds {} bytes", image_path.display(), max_bytes));
    }

    Ok(image)
}

/// Read a photo from disk and run it through an analyzer
///
/// Outer error: the file could not be read. Inner error: analysis failed.
pub async fn analyze_photo(
    analyzer: &dyn Analyzer,
    image_path: &Path,
) -> Result<AnalysisOutcome, String> {
    let image = read_image(image_path, MAX_IMAGE_BYTES).await?;

    if image.is_empty() {
        return Err(format!("Image file {} is empty", image_path.display()));
    }

    Ok(analyzer
        .analyze(&image)
        .await
        .map(AnalysisSuccessResponse::from)
        .map_err(AnalysisFailureResponse::from))
}
