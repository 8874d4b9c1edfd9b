//! Photo analysis pathways
//!
//! Two independent ways of turning image bytes into a [`UnifiedResult`]:
//! resolving classifier candidates against the local catalog, or asking a
//! remote vision model. Both implement [`Analyzer`] and can be swapped or
//! chained with [`FallbackAnalyzer`].

mod fallback;
mod local;
mod remote;
mod transport;
mod upload;
mod wire;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::UnifiedResult;

pub use fallback::FallbackAnalyzer;
pub use local::{
    result_from_candidates, CandidateSource, ClassifyError, LocalAnalyzer, PrecomputedCandidates,
    DEFAULT_MAX_RESULTS,
};
pub use remote::{
    interpret_response, parse_payload, strip_code_fence, RemoteAnalyzer, MALFORMED_EXCERPT_CHARS,
    MAX_TOKENS, REMOTE_RESULT_CONFIDENCE, SYSTEM_PROMPT, TEMPERATURE,
};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use upload::{encode_jpeg_base64, jpeg_data_url, JPEG_QUALITY};
pub use wire::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, MessageContent};

/// Analysis error types
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not process the image: {0}")]
    InvalidImage(String),

    #[error(transparent)]
    Classification(#[from] ClassifyError),

    #[error("No food items detected. Try a clearer photo.")]
    NoCandidates,

    #[error("Detected \"{label}\" but no nutrient data is available")]
    Unresolved { label: String },

    #[error("Request to the vision model failed: {0}")]
    Transport(String),

    #[error("Vision model rejected the request ({0}): {1}")]
    RemoteRejected(u16, String),

    #[error("The vision model returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse vision model response: {0}")]
    MalformedPayload(String),

    #[error("The vision model could not identify any food in the image")]
    NoSubjectDetected,
}

impl AnalysisError {
    /// Stable identifier for the failure mode
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidImage(_) => "invalid_image",
            AnalysisError::Classification(ClassifyError::InvalidImage) => "invalid_image",
            AnalysisError::Classification(ClassifyError::ModelUnavailable(_)) => "model_unavailable",
            AnalysisError::NoCandidates => "no_candidates",
            AnalysisError::Unresolved { .. } => "unresolved",
            AnalysisError::Transport(_) => "transport",
            AnalysisError::RemoteRejected(..) => "remote_rejected",
            AnalysisError::EmptyResponse => "empty_response",
            AnalysisError::MalformedPayload(_) => "malformed_payload",
            AnalysisError::NoSubjectDetected => "no_subject_detected",
        }
    }
}

/// Image bytes in, unified result out
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, image: &[u8]) -> Result<UnifiedResult, AnalysisError>;
}
