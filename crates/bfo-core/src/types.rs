//! Core data types for BFO financial reports.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Inn`] - Taxpayer identification number used as the lookup key
//! - [`Organization`] - A registered organization returned by search
//! - [`ReportRef`] / [`ReportSummary`] - One filed fiscal year and how to fetch it
//! - [`ReportForm`] / [`ReportRow`] - Report body: statement sections with coded rows
//! - [`FinancialSnapshot`] - Derived (year, revenue, profit) result
//! - [`LatestBy`] - Policy for choosing the most recent report

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BfoError;
use crate::taxonomy::Taxonomy;

/// Taxpayer identification number (INN).
///
/// Parsing only checks for a positive integer; the remote service decides
/// whether it belongs to a registered organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Inn(u64);

impl Inn {
    /// Creates an INN from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Inn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Inn {
    type Err = BfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BfoError::InvalidParameter(format!("Not an INN: {s:?}")));
        }
        match trimmed.parse::<u64>() {
            Ok(0) => Err(BfoError::InvalidParameter(format!("Not an INN: {s:?}"))),
            Ok(value) => Ok(Self(value)),
            Err(e) => Err(BfoError::InvalidParameter(format!("Not an INN: {s:?} ({e})"))),
        }
    }
}

impl From<u64> for Inn {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A registered organization as returned by the portal's search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Portal-internal organization id.
    pub id: u64,
    /// Taxpayer identification number as published.
    pub inn: Option<String>,
    /// Primary state registration number.
    pub ogrn: Option<String>,
    /// Short name with search highlighting removed.
    pub short_name: String,
    /// Region of registration.
    pub region: Option<String>,
    /// Registry status (e.g. "ACTIVE").
    pub status_code: Option<String>,
}

impl Organization {
    /// Creates an organization with required fields.
    #[must_use]
    pub fn new(id: u64, short_name: impl Into<String>) -> Self {
        Self {
            id,
            inn: None,
            ogrn: None,
            short_name: short_name.into(),
            region: None,
            status_code: None,
        }
    }

    /// Sets the INN.
    #[must_use]
    pub fn with_inn(mut self, inn: impl Into<String>) -> Self {
        self.inn = Some(inn.into());
        self
    }
}

/// Opaque reference to one filed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportRef {
    organization_id: u64,
    fiscal_year: i32,
}

impl ReportRef {
    /// Creates a reference to the report of `organization_id` for `fiscal_year`.
    #[must_use]
    pub const fn new(organization_id: u64, fiscal_year: i32) -> Self {
        Self {
            organization_id,
            fiscal_year,
        }
    }

    /// Portal-internal id of the filing organization.
    #[must_use]
    pub const fn organization_id(&self) -> u64 {
        self.organization_id
    }

    /// Fiscal year of the referenced report.
    #[must_use]
    pub const fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }
}

/// One entry per fiscal year an organization has filed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Fiscal year of the report.
    pub fiscal_year: i32,
    /// Reference used to fetch the full body.
    pub reference: ReportRef,
    /// Date the currently effective version was filed.
    pub actual_bfo_date: Option<NaiveDate>,
}

impl ReportSummary {
    /// Creates a summary for `reference`.
    #[must_use]
    pub const fn new(reference: ReportRef) -> Self {
        Self {
            fiscal_year: reference.fiscal_year(),
            reference,
            actual_bfo_date: None,
        }
    }

    /// Sets the filing date.
    #[must_use]
    pub const fn with_actual_bfo_date(mut self, date: NaiveDate) -> Self {
        self.actual_bfo_date = Some(date);
        self
    }
}

/// A labeled financial line item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Taxonomy row code (e.g. "2110").
    pub code: String,
    /// Human-readable label, when the source provides one.
    pub label: Option<String>,
    /// Per-year values, most recent first. `None` marks a blank cell.
    pub values: Vec<Option<Decimal>>,
}

impl ReportRow {
    /// Creates a row from its code and values.
    #[must_use]
    pub fn new(code: impl Into<String>, values: Vec<Option<Decimal>>) -> Self {
        Self {
            code: code.into(),
            label: None,
            values,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the most recent value, if present and non-blank.
    #[must_use]
    pub fn leading_value(&self) -> Option<Decimal> {
        self.values.first().copied().flatten()
    }
}

/// A named financial statement (balance sheet, financial result, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportForm {
    /// Section name as published (e.g. "financialResult").
    pub name: String,
    /// Fiscal years of the value columns, most recent first.
    pub periods: Vec<i32>,
    /// Rows in source order.
    pub rows: Vec<ReportRow>,
}

impl ReportForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new(name: impl Into<String>, periods: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            periods,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn with_row(mut self, row: ReportRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Finds the row with the given code.
    #[must_use]
    pub fn row(&self, code: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.code == code)
    }

    /// Fiscal year of the most recent column.
    #[must_use]
    pub fn leading_period(&self) -> Option<i32> {
        self.periods.first().copied()
    }
}

/// Revenue and profit for the most recent fiscal year of a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Fiscal year the figures belong to.
    pub fiscal_year: i32,
    /// Revenue in the reporting currency.
    pub revenue: Decimal,
    /// Net profit (negative for a loss) in the reporting currency.
    pub profit: Decimal,
    /// Taxonomy variant the rows were matched under.
    pub taxonomy: Taxonomy,
    /// Code of the row revenue was read from.
    pub revenue_code: String,
    /// Code of the row profit was read from.
    pub profit_code: String,
}

impl FinancialSnapshot {
    /// Returns `(fiscal_year, revenue, profit)`.
    #[must_use]
    pub fn into_tuple(self) -> (i32, Decimal, Decimal) {
        (self.fiscal_year, self.revenue, self.profit)
    }
}

/// Policy for choosing the most recent report of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatestBy {
    /// Highest fiscal year.
    #[default]
    Period,
    /// Latest filing date, ties broken by fiscal year. Reports without a
    /// filing date sort first.
    FilingDate,
}

impl LatestBy {
    /// Picks the most recent report under this policy.
    #[must_use]
    pub fn pick(self, reports: &[ReportSummary]) -> Option<&ReportSummary> {
        match self {
            Self::Period => reports.iter().max_by_key(|r| r.fiscal_year),
            Self::FilingDate => reports
                .iter()
                .max_by_key(|r| (r.actual_bfo_date.unwrap_or(NaiveDate::MIN), r.fiscal_year)),
        }
    }
}
