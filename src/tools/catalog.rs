//! Catalog MCP Tools
//!
//! Read-only lookups against the nutrient catalog.

use serde::Serialize;

use crate::catalog::{normalize_key, resolve_with_stage, Catalog, MatchStage};
use crate::models::CatalogEntry;

/// Response for lookup_food
#[derive(Debug, Serialize)]
pub struct LookupFoodResponse {
    pub query: String,
    pub matched: bool,
    pub stage: Option<MatchStage>,
    pub entry: Option<CatalogEntry>,
}

/// Summary of a catalog entry for list results
#[derive(Debug, Serialize)]
pub struct CatalogEntrySummary {
    pub name: String,
    pub serving_size: String,
    pub calories: f64,
}

impl From<&CatalogEntry> for CatalogEntrySummary {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            serving_size: entry.serving_size.clone(),
            calories: entry.nutrients.calories,
        }
    }
}

/// Response for list_catalog
#[derive(Debug, Serialize)]
pub struct ListCatalogResponse {
    pub items: Vec<CatalogEntrySummary>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Resolve a single label through the fuzzy resolver
pub fn lookup_food(catalog: &Catalog, label: &str) -> Result<LookupFoodResponse, String> {
    if label.trim().is_empty() {
        return Err("label cannot be empty".to_string());
    }

    let resolution = resolve_with_stage(catalog, label);
    Ok(LookupFoodResponse {
        query: label.to_string(),
        matched: resolution.is_some(),
        stage: resolution.map(|r| r.stage),
        entry: resolution.map(|r| r.entry.clone()),
    })
}

/// List catalog entries in load order, optionally filtered by name substring
pub fn list_catalog(
    catalog: &Catalog,
    query: Option<&str>,
    limit: usize,
    offset: usize,
) -> Result<ListCatalogResponse, String> {
    let limit = limit.clamp(1, 200);
    let needle = query.map(normalize_key).filter(|q| !q.is_empty());

    let matching: Vec<&CatalogEntry> = catalog
        .all_entries()
        .iter()
        .filter(|e| match &needle {
            Some(q) => e.normalized_key().contains(q.as_str()),
            None => true,
        })
        .collect();

    Ok(ListCatalogResponse {
        total: matching.len(),
        items: matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(CatalogEntrySummary::from)
            .collect(),
        limit,
        offset,
    })
}
