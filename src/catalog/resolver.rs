//! Fuzzy label resolution
//!
//! Maps one free-text classifier label to at most one catalog entry. Stages
//! run in a fixed order and the first hit wins; stages are not scored against
//! each other, so an earlier weak match masks a later strong one. Stages that
//! scan keys walk them in load order so results never depend on hash order.

use serde::Serialize;
use tracing::debug;

use super::{normalize_key, Catalog};
use crate::models::CatalogEntry;

/// Tokens must be longer than this to take part in the token stage
const MIN_TOKEN_CHARS: usize = 3;

/// Stage that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Exact,
    SeparatorSwap,
    Substring,
    Token,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Exact => "exact",
            MatchStage::SeparatorSwap => "separator_swap",
            MatchStage::Substring => "substring",
            MatchStage::Token => "token",
        }
    }
}

/// A resolved label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub entry: &'a CatalogEntry,
    pub stage: MatchStage,
}

/// Resolve a label to a catalog entry
pub fn resolve<'a>(catalog: &'a Catalog, raw_label: &str) -> Option<&'a CatalogEntry> {
    resolve_with_stage(catalog, raw_label).map(|r| r.entry)
}

/// Resolve a label, also reporting which stage matched
pub fn resolve_with_stage<'a>(catalog: &'a Catalog, raw_label: &str) -> Option<Resolution<'a>> {
    let query = normalize_key(raw_label);
    if query.is_empty() {
        return None;
    }

    let resolution = exact(catalog, &query)
        .or_else(|| separator_swap(catalog, &query))
        .or_else(|| substring(catalog, &query))
        .or_else(|| token(catalog, &query));

    match &resolution {
        Some(r) => debug!(
            "Resolved '{}' to '{}' via {} match",
            raw_label,
            r.entry.name,
            r.stage.as_str()
        ),
        None => debug!("No catalog match for '{}'", raw_label),
    }

    resolution
}

fn exact<'a>(catalog: &'a Catalog, query: &str) -> Option<Resolution<'a>> {
    catalog.by_key(query).map(|entry| Resolution {
        entry,
        stage: MatchStage::Exact,
    })
}

fn separator_swap<'a>(catalog: &'a Catalog, query: &str) -> Option<Resolution<'a>> {
    let with_underscores = query.replace(' ', "_");
    let with_spaces = query.replace('_', " ");

    catalog
        .by_key(&with_underscores)
        .or_else(|| catalog.by_key(&with_spaces))
        .map(|entry| Resolution {
            entry,
            stage: MatchStage::SeparatorSwap,
        })
}

fn substring<'a>(catalog: &'a Catalog, query: &str) -> Option<Resolution<'a>> {
    catalog
        .keys()
        .find(|key| key.contains(query) || query.contains(key))
        .and_then(|key| catalog.by_key(key))
        .map(|entry| Resolution {
            entry,
            stage: MatchStage::Substring,
        })
}

fn token<'a>(catalog: &'a Catalog, query: &str) -> Option<Resolution<'a>> {
    let spaced = query.replace('_', " ");
    let tokens: Vec<&str> = spaced
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .collect();
    if tokens.is_empty() {
        return None;
    }

    catalog
        .keys()
        .find(|key| tokens.iter().any(|t| key.contains(t)))
        .and_then(|key| catalog.by_key(key))
        .map(|entry| Resolution {
            entry,
            stage: MatchStage::Token,
        })
}
