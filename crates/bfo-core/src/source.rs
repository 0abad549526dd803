//! Report source trait.
//!
//! [`ReportSource`] is the seam between the network transport and the rest
//! of the pipeline: anything that can list a company's reports and fetch one
//! report body can be driven by the orchestration layer.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Inn, Organization, ReportForm, ReportRef, ReportSummary},
};

/// Source of BFO reports.
#[async_trait]
pub trait ReportSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g. "bo.nalog.gov.ru").
    fn name(&self) -> &str;

    /// Resolves a search query (INN, OGRN or name) to a single organization.
    async fn search_organization(&self, query: &str) -> Result<Organization>;

    /// Lists the reports filed by the organization matching a free-text query,
    /// most recent fiscal year first.
    async fn find_reports_by_query(&self, query: &str) -> Result<Vec<ReportSummary>>;

    /// Lists the reports filed under an INN, most recent fiscal year first.
    ///
    /// Fails with [`BfoError::NotFound`](crate::BfoError::NotFound) if no
    /// registered organization has this INN.
    async fn find_reports(&self, inn: Inn) -> Result<Vec<ReportSummary>> {
        self.find_reports_by_query(&inn.to_string()).await
    }

    /// Fetches and decodes the body of one report.
    async fn fetch_report(&self, reference: &ReportRef) -> Result<Vec<ReportForm>>;
}
