//! Revenue/profit lookup over a report source.

use tracing::debug;

use bfo_core::{
    BfoError, FinancialSnapshot, Inn, LatestBy, ReportForm, ReportRef, ReportSource,
    ReportSummary, Result, extract_latest,
};

/// Composes a [`ReportSource`] with report selection and extraction.
///
/// # Example
///
/// ```rust,ignore
/// use bfo::{BfoClient, Inn, NalogConfig};
///
/// let client = BfoClient::open(NalogConfig::default())?;
/// let (year, revenue, profit) = client
///     .get_last_year_revenue_profit(Inn::new(7735146464))
///     .await?
///     .into_tuple();
/// client.close();
/// ```
#[derive(Debug)]
pub struct BfoClient<S> {
    source: S,
    latest_by: LatestBy,
}

impl<S: ReportSource> BfoClient<S> {
    /// Wraps a report source, choosing the latest report by fiscal year.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            latest_by: LatestBy::default(),
        }
    }

    /// Sets the policy used to pick the most recent report.
    #[must_use]
    pub fn with_latest_by(mut self, latest_by: LatestBy) -> Self {
        self.latest_by = latest_by;
        self
    }

    /// Returns the underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the client and returns the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Lists the reports filed under an INN, most recent fiscal year first.
    pub async fn find_reports(&self, inn: Inn) -> Result<Vec<ReportSummary>> {
        self.source.find_reports(inn).await
    }

    /// Fetches the body of one report.
    pub async fn fetch_report(&self, reference: &ReportRef) -> Result<Vec<ReportForm>> {
        self.source.fetch_report(reference).await
    }

    /// Extracts revenue and profit from a report body.
    pub fn extract_latest(&self, forms: &[ReportForm]) -> Result<FinancialSnapshot> {
        extract_latest(forms)
    }

    /// Fetches the most recent report filed under an INN and extracts its
    /// revenue and profit.
    ///
    /// Errors from any step are returned unchanged.
    pub async fn get_last_year_revenue_profit(&self, inn: Inn) -> Result<FinancialSnapshot> {
        debug!(source = self.source.name(), %inn, "Looking up last year revenue and profit");
        let reports = self.source.find_reports(inn).await?;
        self.snapshot_of_latest(&reports, &inn.to_string()).await
    }

    /// Like [`get_last_year_revenue_profit`](Self::get_last_year_revenue_profit),
    /// resolving the organization from a free-text query (INN, OGRN or name).
    pub async fn get_last_year_revenue_profit_by_query(
        &self,
        query: &str,
    ) -> Result<FinancialSnapshot> {
        debug!(source = self.source.name(), query, "Looking up last year revenue and profit");
        let reports = self.source.find_reports_by_query(query).await?;
        self.snapshot_of_latest(&reports, query).await
    }

    async fn snapshot_of_latest(
        &self,
        reports: &[ReportSummary],
        key: &str,
    ) -> Result<FinancialSnapshot> {
        let latest = self
            .latest_by
            .pick(reports)
            .ok_or_else(|| BfoError::NotFound(format!("No reports filed for {key}")))?;

        debug!(
            fiscal_year = latest.fiscal_year,
            policy = ?self.latest_by,
            "Selected latest report"
        );
        let forms = self.source.fetch_report(&latest.reference).await?;
        extract_latest(&forms)
    }
}

#[cfg(feature = "nalog")]
impl BfoClient<bfo_nalog::NalogSession> {
    /// Opens a portal session and wraps it.
    ///
    /// # Errors
    ///
    /// See [`NalogClient::open`](bfo_nalog::NalogClient::open).
    pub fn open(config: bfo_nalog::NalogConfig) -> Result<Self> {
        bfo_nalog::NalogClient::new(config).open().map(Self::new)
    }

    /// Closes the underlying session.
    pub fn close(self) {
        self.source.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bfo_core::{Organization, ReportRow, Taxonomy};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory source: one organization, bodies keyed by fiscal year.
    #[derive(Debug, Default)]
    struct StaticSource {
        inn: u64,
        reports: Vec<ReportSummary>,
        bodies: HashMap<i32, Vec<ReportForm>>,
        fetched: Mutex<Vec<i32>>,
    }

    impl StaticSource {
        fn with_year(mut self, year: i32, forms: Vec<ReportForm>) -> Self {
            self.reports
                .push(ReportSummary::new(ReportRef::new(1, year)));
            self.bodies.insert(year, forms);
            self
        }

        fn fetched(&self) -> Vec<i32> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn search_organization(&self, query: &str) -> Result<Organization> {
            if query == self.inn.to_string() || query == "ООО Тест" {
                Ok(Organization::new(1, "ООО Тест").with_inn(self.inn.to_string()))
            } else {
                Err(BfoError::NotFound(query.to_string()))
            }
        }

        async fn find_reports_by_query(&self, query: &str) -> Result<Vec<ReportSummary>> {
            self.search_organization(query).await?;
            Ok(self.reports.clone())
        }

        async fn fetch_report(&self, reference: &ReportRef) -> Result<Vec<ReportForm>> {
            self.fetched.lock().unwrap().push(reference.fiscal_year());
            self.bodies
                .get(&reference.fiscal_year())
                .cloned()
                .ok_or_else(|| BfoError::NotFound(format!("{reference:?}")))
        }
    }

    fn result_form(year: i32, revenue: i64, profit: i64) -> Vec<ReportForm> {
        vec![
            ReportForm::new("financialResult", vec![year, year - 1])
                .with_row(ReportRow::new(
                    "2110",
                    vec![Some(Decimal::from(revenue)), Some(Decimal::from(revenue - 1))],
                ))
                .with_row(ReportRow::new(
                    "2400",
                    vec![Some(Decimal::from(profit)), Some(Decimal::from(profit - 1))],
                )),
        ]
    }

    fn source() -> StaticSource {
        StaticSource {
            inn: 7735146464,
            ..Default::default()
        }
        .with_year(2022, result_form(2022, 10, 1))
        .with_year(2024, result_form(2024, 30, 3))
        .with_year(2023, result_form(2023, 20, 2))
    }

    #[tokio::test]
    async fn test_selects_most_recent_year() {
        let client = BfoClient::new(source());
        let snapshot = client
            .get_last_year_revenue_profit(Inn::new(7735146464))
            .await
            .unwrap();

        assert_eq!(
            snapshot.clone().into_tuple(),
            (2024, Decimal::from(30), Decimal::from(3))
        );
        assert_eq!(snapshot.taxonomy, Taxonomy::Rsbu2011);
        assert_eq!(client.source().fetched(), vec![2024]);

        let source = client.into_inner();
        assert_eq!(source.fetched(), vec![2024]);
    }

    #[tokio::test]
    async fn test_selects_latest_filing() {
        let mut source = source();
        source.reports = source
            .reports
            .into_iter()
            .map(|r| {
                // 2022 was corrected after the 2024 report was filed.
                let (y, m, d) = match r.fiscal_year {
                    2022 => (2025, 6, 1),
                    2023 => (2024, 3, 1),
                    _ => (2025, 3, 1),
                };
                r.with_actual_bfo_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
            })
            .collect();

        let client = BfoClient::new(source).with_latest_by(LatestBy::FilingDate);
        let snapshot = client
            .get_last_year_revenue_profit(Inn::new(7735146464))
            .await
            .unwrap();
        assert_eq!(snapshot.fiscal_year, 2022);
        assert_eq!(client.source().fetched(), vec![2022]);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let client = BfoClient::new(source());
        let inn = Inn::new(7735146464);
        let first = client.get_last_year_revenue_profit(inn).await.unwrap();
        let second = client.get_last_year_revenue_profit(inn).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_inn_propagates_not_found() {
        let client = BfoClient::new(source());
        let err = client
            .get_last_year_revenue_profit(Inn::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BfoError::NotFound(_)));
        assert!(client.source().fetched().is_empty());
    }

    #[tokio::test]
    async fn test_no_reports_is_not_found() {
        let client = BfoClient::new(StaticSource {
            inn: 42,
            ..Default::default()
        });
        let err = client
            .get_last_year_revenue_profit(Inn::new(42))
            .await
            .unwrap_err();
        assert!(matches!(err, BfoError::NotFound(ref msg) if msg.contains("42")));
    }

    #[tokio::test]
    async fn test_extraction_errors_are_not_partial() {
        let broken = vec![ReportForm::new("financialResult", vec![2025]).with_row(
            ReportRow::new("2110", vec![Some(Decimal::from(5))]),
        )];
        let client = BfoClient::new(source().with_year(2025, broken));
        let err = client
            .get_last_year_revenue_profit(Inn::new(7735146464))
            .await
            .unwrap_err();
        assert!(matches!(err, BfoError::FieldNotFound { ref field } if field == "profit"));
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let client = BfoClient::new(source());
        let snapshot = client
            .get_last_year_revenue_profit_by_query("ООО Тест")
            .await
            .unwrap();
        assert_eq!(snapshot.fiscal_year, 2024);
    }

    #[tokio::test]
    async fn test_lower_level_calls() {
        let client = BfoClient::new(source());
        let reports = client.find_reports(Inn::new(7735146464)).await.unwrap();
        assert_eq!(reports.len(), 3);

        let forms = client.fetch_report(&reports[0].reference).await.unwrap();
        let snapshot = client.extract_latest(&forms).unwrap();
        assert_eq!(snapshot.fiscal_year, reports[0].fiscal_year);
    }
}
