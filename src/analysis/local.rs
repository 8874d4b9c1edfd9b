//! Catalog-based analysis
//!
//! An image classifier proposes ranked labels; the catalog resolver turns the
//! first label it recognizes into a result. The classifier itself is an opaque
//! [`CandidateSource`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{AnalysisError, Analyzer};
use crate::catalog::{resolve_best, Catalog};
use crate::models::{Candidate, UnifiedResult};

/// Number of candidates requested from the classifier
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Classifier error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("Could not process the image")]
    InvalidImage,

    #[error("The food recognition model is unavailable: {0}")]
    ModelUnavailable(String),
}

/// Produces ranked (label, confidence) candidates for an image
///
/// Candidates come back in descending confidence order. An empty list is a
/// valid answer; confidences need not sum to 1.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn classify(&self, image: &[u8], max_results: usize) -> Result<Vec<Candidate>, ClassifyError>;
}

/// Candidate source that replays a list computed elsewhere
///
/// Used when classification already happened on the caller's side.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedCandidates {
    candidates: Vec<Candidate>,
}

impl PrecomputedCandidates {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl CandidateSource for PrecomputedCandidates {
    async fn classify(&self, _image: &[u8], max_results: usize) -> Result<Vec<Candidate>, ClassifyError> {
        Ok(self.candidates.iter().take(max_results).cloned().collect())
    }
}

/// Turn a ranked candidate list into a result
///
/// When nothing resolves, the error names the top candidate's label.
pub fn result_from_candidates(
    catalog: &Catalog,
    candidates: &[Candidate],
) -> Result<UnifiedResult, AnalysisError> {
    let top = candidates.first().ok_or(AnalysisError::NoCandidates)?;

    match resolve_best(catalog, candidates) {
        Some((entry, confidence)) => Ok(UnifiedResult::from_catalog_entry(entry, confidence)),
        None => Err(AnalysisError::Unresolved {
            label: top.label.clone(),
        }),
    }
}

/// Analyzer that classifies locally and resolves against the catalog
pub struct LocalAnalyzer<S: CandidateSource> {
    catalog: Arc<Catalog>,
    source: S,
    max_results: usize,
}

impl<S: CandidateSource> LocalAnalyzer<S> {
    pub fn new(catalog: Arc<Catalog>, source: S) -> Self {
        Self {
            catalog,
            source,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait]
impl<S: CandidateSource> Analyzer for LocalAnalyzer<S> {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn analyze(&self, image: &[u8]) -> Result<UnifiedResult, AnalysisError> {
        let candidates = self.source.classify(image, self.max_results).await?;
        info!("Classifier proposed {} candidates", candidates.len());
        result_from_candidates(&self.catalog, &candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::catalog;

    struct FailingSource(ClassifyError);

    #[async_trait]
    impl CandidateSource for FailingSource {
        async fn classify(&self, _image: &[u8], _max_results: usize) -> Result<Vec<Candidate>, ClassifyError> {
            Err(self.0.clone())
        }
    }

    fn analyzer(names: &[&str], candidates: Vec<Candidate>) -> LocalAnalyzer<PrecomputedCandidates> {
        LocalAnalyzer::new(Arc::new(catalog(names)), PrecomputedCandidates::new(candidates))
    }

    #[tokio::test]
    async fn test_resolves_first_matching_candidate() {
        let analyzer = analyzer(
            &["pizza", "sushi"],
            vec![Candidate::new("blah", 0.9), Candidate::new("pizza", 0.5)],
        );

        let result = analyzer.analyze(b"jpeg").await.unwrap();
        assert_eq!(result.food_name, "pizza");
        assert_eq!(result.serving_size, "1 serving");
        assert_eq!(result.nutrients.calories, 100.0);
        assert_eq!(result.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_unresolved_names_top_candidate() {
        let analyzer = analyzer(
            &["pizza"],
            vec![Candidate::new("broccoli", 0.8), Candidate::new("kale", 0.1)],
        );

        match analyzer.analyze(b"jpeg").await {
            Err(AnalysisError::Unresolved { label }) => assert_eq!(label, "broccoli"),
            other => panic!("expected Unresolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let analyzer = analyzer(&["pizza"], vec![]);
        assert!(matches!(
            analyzer.analyze(b"jpeg").await,
            Err(AnalysisError::NoCandidates)
        ));
    }

    #[tokio::test]
    async fn test_max_results_limits_candidates() {
        let analyzer = analyzer(
            &["pizza"],
            vec![Candidate::new("blah", 0.6), Candidate::new("pizza", 0.3)],
        )
        .with_max_results(1);

        match analyzer.analyze(b"jpeg").await {
            Err(AnalysisError::Unresolved { label }) => assert_eq!(label, "blah"),
            other => panic!("expected Unresolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classifier_errors_pass_through() {
        let analyzer = LocalAnalyzer::new(
            Arc::new(catalog(&["pizza"])),
            FailingSource(ClassifyError::ModelUnavailable("not loaded".to_string())),
        );

        match analyzer.analyze(b"jpeg").await {
            Err(AnalysisError::Classification(ClassifyError::ModelUnavailable(msg))) => {
                assert_eq!(msg, "not loaded")
            }
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_never_resolves() {
        let analyzer = LocalAnalyzer::new(
            Arc::new(Catalog::empty()),
            PrecomputedCandidates::new(vec![Candidate::new("pizza", 0.99)]),
        );
        assert!(matches!(
            analyzer.analyze(b"jpeg").await,
            Err(AnalysisError::Unresolved { .. })
        ));
    }
}
