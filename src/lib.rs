//! Meal Analyzer Library
//!
//! Identifies food in photos and attaches nutrient profiles, either by
//! resolving image-classifier labels against a nutrient catalog or by asking
//! a remote vision model.

pub mod analysis;
pub mod build_info;
pub mod catalog;
pub mod config;
pub mod mcp;
pub mod models;
pub mod tools;
