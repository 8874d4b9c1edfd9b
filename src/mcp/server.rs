//! Meal Analyzer MCP Server Implementation
//!
//! Exposes catalog resolution and remote photo analysis as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::catalog::Catalog;
use crate::models::Candidate;
use crate::tools::analysis::{self, AnalysisOutcome};
use crate::tools::catalog;
use crate::tools::status::StatusTracker;

/// Meal Analyzer MCP Service
#[derive(Clone)]
pub struct MealAnalyzerService {
    status_tracker: Arc<StatusTracker>,
    catalog: Arc<Catalog>,
    /// `None` when no API key is configured
    remote: Option<Arc<dyn Analyzer>>,
    tool_router: ToolRouter<MealAnalyzerService>,
}

impl MealAnalyzerService {
    pub fn new(
        catalog: Arc<Catalog>,
        remote: Option<Arc<dyn Analyzer>>,
        status_tracker: StatusTracker,
    ) -> Self {
        Self {
            status_tracker: Arc::new(status_tracker),
            catalog,
            remote,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CandidateParam {
    /// Classifier label, e.g. "chicken_curry"
    pub label: String,
    /// Classifier confidence between 0 and 1
    pub confidence: f64,
}

impl From<CandidateParam> for Candidate {
    fn from(p: CandidateParam) -> Self {
        Candidate::new(p.label, p.confidence)
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveClassificationParams {
    /// Candidates in the order the classifier returned them (highest confidence first)
    pub candidates: Vec<CandidateParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupFoodParams {
    /// Free-text food label
    pub label: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCatalogParams {
    /// Optional name filter (case-insensitive substring)
    pub query: Option<String>,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    /// Offset for pagination
    #[serde(default)]
    pub offset: usize,
}

fn default_list_limit() -> usize { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzePhotoParams {
    /// Path to a photo readable by the server (JPEG, PNG, ...)
    pub image_path: String,
    /// Optional on-device classifier candidates, resolved against the catalog if the vision model fails
    #[serde(default)]
    pub fallback_candidates: Option<Vec<CandidateParam>>,
}

// ============================================================================
// Helpers
// ============================================================================

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn outcome_result(outcome: AnalysisOutcome) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(success) => json_result(&success),
        Err(failure) => json_result(&failure),
    }
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl MealAnalyzerService {
    // --- Status ---

    #[tool(description = "Get the current status of the Meal Analyzer service including build info, catalog size, and whether remote analysis is enabled")]
    async fn get_status(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for analyzing meal photos. Call this before using the analysis tools for the first time.")]
    fn analysis_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYSIS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ANALYSIS_INSTRUCTIONS)]))
    }

    // --- Local pathway ---

    #[tool(description = "Resolve ranked image-classifier candidates against the nutrient catalog. Returns the first candidate that matches a known food, with its nutrients and the candidate's confidence.")]
    async fn resolve_classification(&self, Parameters(p): Parameters<ResolveClassificationParams>) -> Result<CallToolResult, McpError> {
        let candidates: Vec<Candidate> = p.candidates.into_iter().map(Candidate::from).collect();
        let outcome = analysis::resolve_classification(self.catalog.clone(), candidates)
            .await
            .map_err(|e| McpError::invalid_params(e, None))?;
        outcome_result(outcome)
    }

    #[tool(description = "Resolve a single food label against the catalog and report which match stage succeeded (exact, separator_swap, substring, token)")]
    fn lookup_food(&self, Parameters(p): Parameters<LookupFoodParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::lookup_food(&self.catalog, &p.label)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List catalog foods in catalog order with optional name filter and pagination")]
    fn list_catalog(&self, Parameters(p): Parameters<ListCatalogParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::list_catalog(&self.catalog, p.query.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Remote pathway ---

    #[tool(description = "Identify the food in a photo and estimate its nutrients with a remote vision model. Requires OPENAI_API_KEY on the server. Optional fallback_candidates are resolved against the catalog if the model fails.")]
    async fn analyze_photo_remote(&self, Parameters(p): Parameters<AnalyzePhotoParams>) -> Result<CallToolResult, McpError> {
        let analyzer = self.remote.as_ref().ok_or_else(|| {
            McpError::internal_error(
                "Remote analysis is not configured. Set OPENAI_API_KEY and restart the server.",
                None,
            )
        })?;

        let fallback: Option<Vec<Candidate>> = p
            .fallback_candidates
            .map(|c| c.into_iter().map(Candidate::from).collect());
        let analyzer = analysis::remote_with_fallback(analyzer.clone(), self.catalog.clone(), fallback)
            .map_err(|e| McpError::invalid_params(e, None))?;

        let path = PathBuf::from(p.image_path);
        let outcome = analysis::analyze_photo(analyzer.as_ref(), &path)
            .await
            .map_err(|e| McpError::invalid_params(e, None))?;
        outcome_result(outcome)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealAnalyzerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "meal-analyzer".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Meal Analyzer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Meal Analyzer - identify food in photos and attach nutrient profiles. \
                 IMPORTANT: Call analysis_instructions first. \
                 Local: resolve_classification (pass classifier candidates unchanged). \
                 Remote: analyze_photo_remote (image path, optional fallback_candidates; needs OPENAI_API_KEY). \
                 Catalog: lookup_food, list_catalog. Status: get_status."
                    .into(),
            ),
        }
    }
}
