//! Meal Analyzer
//!
//! An MCP server for identifying food in photos and attaching nutrient profiles.

use std::sync::Arc;

use meal_analyzer::analysis::{Analyzer, RemoteAnalyzer};
use meal_analyzer::build_info;
use meal_analyzer::catalog::Catalog;
use meal_analyzer::config::Config;
use meal_analyzer::mcp::MealAnalyzerService;
use meal_analyzer::tools::status::StatusTracker;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr to not interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meal_analyzer=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = Config::from_env()?;

    let catalog_source = match &config.catalog_path {
        Some(path) => path.display().to_string(),
        None => "bundled".to_string(),
    };
    eprintln!("Catalog: {}", catalog_source);
    let catalog = Arc::new(Catalog::load_or_empty(config.catalog_path.as_deref()));
    eprintln!("Catalog entries: {}", catalog.len());

    let remote: Option<Arc<dyn Analyzer>> = match &config.remote {
        Some(remote_config) => {
            let analyzer = RemoteAnalyzer::from_config(remote_config)?;
            Some(Arc::new(analyzer) as Arc<dyn Analyzer>)
        }
        None => {
            eprintln!("OPENAI_API_KEY not set; remote analysis disabled");
            None
        }
    };
    let remote_model = config.remote.as_ref().map(|r| r.model.clone());

    let status = StatusTracker::new(catalog_source, catalog.len(), remote_model);
    let service = MealAnalyzerService::new(catalog, remote, status);

    eprintln!("Starting MCP server on stdio...");
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
