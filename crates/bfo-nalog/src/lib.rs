#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bfo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Transport for the BFO portal of the Russian tax authority (`bo.nalog.gov.ru`).
//!
//! This crate provides:
//!
//! - Organization search by INN, OGRN or name
//! - Report list lookup for an organization
//! - Report body decoding into [`ReportForm`]s
//! - Proxy and timeout configuration via [`NalogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use bfo_core::{Inn, ReportSource, extract_latest};
//! use bfo_nalog::{NalogClient, NalogConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = NalogClient::new(NalogConfig::default()).open()?;
//!
//!     let reports = session.find_reports(Inn::new(7735146464)).await?;
//!     let forms = session.fetch_report(&reports[0].reference).await?;
//!     let snapshot = extract_latest(&forms)?;
//!     println!("{}: revenue {}, profit {}", snapshot.fiscal_year, snapshot.revenue, snapshot.profit);
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bfo_core::{
    BfoError, Organization, ReportForm, ReportRef, ReportSource, ReportSummary, Result,
};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

mod config;
mod search;
mod wire;

pub use config::{DEFAULT_TIMEOUT, NALOG_BASE_URL, NalogConfig, USER_AGENT};

/// Organization search endpoint.
const SEARCH_PATH: &str = "/advanced-search/organizations/search";

/// Page size requested from the search endpoint.
const SEARCH_PAGE_SIZE: u32 = 20;

/// Factory for [`NalogSession`]s.
///
/// Holds configuration only; no connection exists until [`open`](Self::open).
#[derive(Clone, Debug, Default)]
pub struct NalogClient {
    config: NalogConfig,
    client: Option<reqwest::Client>,
}

impl NalogClient {
    /// Creates a client with the given configuration.
    #[must_use]
    pub fn new(config: NalogConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Creates a client that reuses a caller-built HTTP client.
    ///
    /// Proxy and timeout settings of `config` are ignored. The portal's
    /// headers and the configured user agent are still sent with every
    /// request, taking precedence over the client's own defaults for the
    /// same header names.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: NalogConfig) -> Self {
        Self {
            config,
            client: Some(client),
        }
    }

    /// Returns the configuration sessions are opened with.
    #[must_use]
    pub const fn config(&self) -> &NalogConfig {
        &self.config
    }

    /// Opens a session.
    ///
    /// # Errors
    ///
    /// [`BfoError::InvalidParameter`] for a malformed proxy URL or user
    /// agent, [`BfoError::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn open(&self) -> Result<NalogSession> {
        let headers = self.config.request_headers()?;
        let client = match &self.client {
            Some(client) => client.clone(),
            None => self.config.build_client()?,
        };
        debug!(base_url = self.config.base_url(), "Opened BFO session");
        Ok(NalogSession {
            client,
            headers,
            base_url: self.config.base_url().to_string(),
            requests: AtomicU64::new(0),
        })
    }
}

/// An open session with the portal.
///
/// Owns the pooled connection. The pool is released when the session is
/// dropped, whether through [`close`](Self::close), an early return, a panic
/// or a cancelled future. Dropping an in-flight request future aborts that
/// request.
#[derive(Debug)]
pub struct NalogSession {
    client: reqwest::Client,
    headers: HeaderMap,
    base_url: String,
    requests: AtomicU64,
}

impl NalogSession {
    /// Opens a session with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`NalogClient::open`].
    pub fn open_default() -> Result<Self> {
        NalogClient::default().open()
    }

    /// Closes the session and releases its connections.
    pub fn close(self) {}

    /// Number of requests issued so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn bfo_url(&self, organization_id: u64) -> String {
        format!("{}/nbo/organizations/{organization_id}/bfo/", self.base_url)
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!(url, "BFO request");

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BfoError::Transport(format!("HTTP {status} from {url}: {text}")));
        }

        let text = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&text)
            .map_err(|e| BfoError::Parse(format!("Failed to parse response from {url}: {e}")))
    }

    async fn fetch_report_list(&self, organization_id: u64) -> Result<Vec<wire::WireReport>> {
        let payload: Value = self.get(&self.bfo_url(organization_id), &[]).await?;
        wire::decode_report_list(payload)
    }
}

impl Drop for NalogSession {
    fn drop(&mut self) {
        debug!(
            requests = self.request_count(),
            "Released BFO session"
        );
    }
}

fn transport_error(e: reqwest::Error) -> BfoError {
    if e.is_timeout() {
        BfoError::Transport(format!("Request timed out: {e}"))
    } else {
        BfoError::Transport(e.to_string())
    }
}

#[async_trait]
impl ReportSource for NalogSession {
    fn name(&self) -> &str {
        "bo.nalog.gov.ru"
    }

    async fn search_organization(&self, query: &str) -> Result<Organization> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BfoError::InvalidParameter("Empty search query".to_string()));
        }

        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let params = [
            ("query", query.to_string()),
            ("page", "0".to_string()),
            ("size", SEARCH_PAGE_SIZE.to_string()),
        ];
        let response: wire::SearchResponse = self.get(&url, &params).await?;
        debug!(
            query,
            total = response.total_elements,
            "Organization search finished"
        );

        search::resolve(response, query)
    }

    async fn find_reports_by_query(&self, query: &str) -> Result<Vec<ReportSummary>> {
        let organization = self.search_organization(query).await?;
        let reports = self.fetch_report_list(organization.id).await?;
        let summaries = wire::summaries(organization.id, &reports);
        debug!(
            organization_id = organization.id,
            reports = summaries.len(),
            "Fetched report list"
        );
        Ok(summaries)
    }

    async fn fetch_report(&self, reference: &ReportRef) -> Result<Vec<ReportForm>> {
        let year = reference.fiscal_year();
        let reports = self.fetch_report_list(reference.organization_id()).await?;

        let report = reports
            .iter()
            .find(|r| r.fiscal_year() == Some(year))
            .ok_or_else(|| {
                BfoError::NotFound(format!(
                    "No {year} report for organization {}",
                    reference.organization_id()
                ))
            })?;

        match report.best_correction() {
            Some(correction) => Ok(wire::decode_forms(year, correction)),
            None => {
                warn!(
                    organization_id = reference.organization_id(),
                    year, "Report has no corrections"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_source_name() {
        let session = NalogSession::open_default().unwrap();
        assert_eq!(session.name(), "bo.nalog.gov.ru");
        assert_eq!(session.request_count(), 0);
    }

    #[test]
    fn test_bfo_url() {
        let config = NalogConfig::new().with_base_url("http://localhost:9000/");
        let session = NalogClient::new(config).open().unwrap();
        assert_eq!(
            session.bfo_url(9392519),
            "http://localhost:9000/nbo/organizations/9392519/bfo/"
        );
    }

    #[test]
    fn test_open_rejects_bad_proxy() {
        let client = NalogClient::new(NalogConfig::new().with_proxy("not a url"));
        assert!(matches!(client.open(), Err(BfoError::InvalidParameter(_))));
    }

    #[test]
    fn test_with_client_skips_config_validation() {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let client = NalogClient::with_client(http, NalogConfig::new().with_proxy("not a url"));
        assert!(client.open().is_ok());
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_request() {
        let session = NalogClient::default().open().unwrap();
        let err = session.search_organization("   ").await.unwrap_err();
        assert!(matches!(err, BfoError::InvalidParameter(_)));
        assert_eq!(session.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = NalogConfig::new()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .without_system_proxy();
        let session = NalogClient::new(config).open().unwrap();

        let err = session.find_reports_by_query("7735146464").await.unwrap_err();
        assert!(matches!(err, BfoError::Transport(_)));
        assert_eq!(session.request_count(), 1);
    }
}
