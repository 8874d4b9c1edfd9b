//! Meal Analyzer Tools module
//!
//! MCP tool implementations, independent of the MCP transport.

pub mod analysis;
pub mod catalog;
pub mod status;
