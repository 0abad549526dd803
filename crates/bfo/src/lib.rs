#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bfo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Last-year revenue and profit from Russian BFO financial reports.
//!
//! This crate re-exports the core types and the portal transport, and
//! provides a [`BfoClient`] that chains organization lookup, report
//! selection and extraction into a single call.
//!
//! # Features
//!
//! - `nalog` - Transport for `bo.nalog.gov.ru` (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use bfo::{BfoClient, Inn, NalogConfig};
//!
//! #[tokio::main]
//! async fn main() -> bfo::Result<()> {
//!     let client = BfoClient::open(NalogConfig::default())?;
//!
//!     let snapshot = client
//!         .get_last_year_revenue_profit(Inn::new(7735146464))
//!         .await?;
//!     println!(
//!         "{}: revenue {}, profit {} (rows {}/{})",
//!         snapshot.fiscal_year,
//!         snapshot.revenue,
//!         snapshot.profit,
//!         snapshot.revenue_code,
//!         snapshot.profit_code,
//!     );
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use bfo_core::*;

// Transport
#[cfg(feature = "nalog")]
pub use bfo_nalog::{DEFAULT_TIMEOUT, NALOG_BASE_URL, NalogClient, NalogConfig, NalogSession};

mod client;
pub use client::BfoClient;
