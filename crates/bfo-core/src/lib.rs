#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bfo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and extraction for BFO financial reports.
//!
//! This crate provides the transport-independent part of the pipeline:
//!
//! - [`ReportSource`](source::ReportSource) - Trait for listing and fetching reports
//! - [`extract_latest`](extract::extract_latest) - Revenue/profit extraction
//! - [`TAXONOMIES`](taxonomy::TAXONOMIES) - Row-code tables in priority order
//! - [`BfoError`](error::BfoError) - Error type shared by all crates

/// Error types for report operations.
pub mod error;
/// Revenue and profit extraction.
pub mod extract;
/// Report source trait.
pub mod source;
/// Row-code taxonomies.
pub mod taxonomy;
/// Core data types (Inn, ReportForm, FinancialSnapshot, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{BfoError, Result};
pub use extract::{detect_taxonomy, extract_latest};
pub use source::ReportSource;
pub use taxonomy::{INCOME_STATEMENT, RowCode, TAXONOMIES, Taxonomy, TaxonomyCodes};
pub use types::{
    FinancialSnapshot, Inn, LatestBy, Organization, ReportForm, ReportRef, ReportRow,
    ReportSummary,
};
