//! Revenue and profit extraction from report bodies.
//!
//! [`extract_latest`] detects the taxonomy of a report by walking
//! [`TAXONOMIES`] in priority order: the first taxonomy with any of its
//! revenue or profit rows present is the one the report is read under, and
//! rows of lower-priority taxonomies are ignored. Rows are only read from the
//! form a taxonomy names, since balance sheets reuse the same codes.
//! Extraction either yields a complete [`FinancialSnapshot`] or fails.

use crate::{
    error::{BfoError, Result},
    taxonomy::{RowCode, TAXONOMIES, TaxonomyCodes},
    types::{FinancialSnapshot, ReportForm, ReportRow},
};

const REVENUE: &str = "revenue";
const PROFIT: &str = "profit";

/// Returns the taxonomy a report is written in, if any is recognized.
#[must_use]
pub fn detect_taxonomy(forms: &[ReportForm]) -> Option<&'static TaxonomyCodes> {
    TAXONOMIES.iter().find(|t| {
        t.all()
            .any(|rc| statements(forms, t).any(|f| f.row(rc.code).is_some()))
    })
}

/// Forms a taxonomy's rows are read from.
fn statements<'a>(
    forms: &'a [ReportForm],
    codes: &TaxonomyCodes,
) -> impl Iterator<Item = &'a ReportForm> {
    let name = codes.form;
    forms.iter().filter(move |f| f.name == name)
}

/// Finds the first row matching `codes`, codes taking priority over form order.
fn find_row<'a>(
    forms: &'a [ReportForm],
    taxonomy: &TaxonomyCodes,
    codes: &[RowCode],
) -> Option<(&'a ReportForm, &'a ReportRow)> {
    codes.iter().find_map(|rc| {
        statements(forms, taxonomy).find_map(|form| form.row(rc.code).map(|row| (form, row)))
    })
}

/// Extracts revenue and profit for the most recent fiscal year of a report.
///
/// # Errors
///
/// - [`BfoError::FieldNotFound`] if no known taxonomy matches, or the detected
///   taxonomy lacks a revenue or profit row.
/// - [`BfoError::NoData`] if a matched row is empty or its leading value is
///   blank, or the revenue row's form carries no fiscal years.
pub fn extract_latest(forms: &[ReportForm]) -> Result<FinancialSnapshot> {
    let codes = detect_taxonomy(forms).ok_or_else(|| BfoError::field_not_found(REVENUE))?;

    let (revenue_form, revenue_row) =
        find_row(forms, codes, codes.revenue).ok_or_else(|| BfoError::field_not_found(REVENUE))?;
    let (_, profit_row) =
        find_row(forms, codes, codes.profit).ok_or_else(|| BfoError::field_not_found(PROFIT))?;

    let fiscal_year = revenue_form
        .leading_period()
        .ok_or_else(|| BfoError::no_data("fiscal year", &revenue_row.code))?;
    let revenue = revenue_row
        .leading_value()
        .ok_or_else(|| BfoError::no_data(REVENUE, &revenue_row.code))?;
    let profit = profit_row
        .leading_value()
        .ok_or_else(|| BfoError::no_data(PROFIT, &profit_row.code))?;

    Ok(FinancialSnapshot {
        fiscal_year,
        revenue,
        profit,
        taxonomy: codes.taxonomy,
        revenue_code: revenue_row.code.clone(),
        profit_code: profit_row.code.clone(),
    })
}
