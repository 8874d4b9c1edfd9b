//! Fallback chaining of analyzers

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{AnalysisError, Analyzer};
use crate::models::UnifiedResult;

/// Tries `primary`, then `secondary` if the primary fails
///
/// The secondary's outcome is returned as-is; the primary's error is logged
/// and dropped.
pub struct FallbackAnalyzer {
    primary: Arc<dyn Analyzer>,
    secondary: Arc<dyn Analyzer>,
}

impl FallbackAnalyzer {
    pub fn new(primary: Arc<dyn Analyzer>, secondary: Arc<dyn Analyzer>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl Analyzer for FallbackAnalyzer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn analyze(&self, image: &[u8]) -> Result<UnifiedResult, AnalysisError> {
        match self.primary.analyze(image).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    "{} analysis failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.secondary.name()
                );
                self.secondary.analyze(image).await
            }
        }
    }
}
