//! Portal response types and their conversion into the report model.
//!
//! Report bodies arrive as correction objects whose sections (`balance`,
//! `financialResult`, ...) hold flat keys such as `current2110`,
//! `previous2110` and `beforePrevious2110`. Each section becomes a
//! [`ReportForm`] with one [`ReportRow`] per code.

use std::str::FromStr;
use std::sync::LazyLock;

use bfo_core::{BfoError, ReportForm, ReportRef, ReportRow, ReportSummary, Result, taxonomy};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Cell keys: column prefix followed by the row code.
static CELL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(current|previous|beforePrevious)(\d+)$").expect("valid cell key pattern")
});

/// Keys some deployments wrap the report list in.
const LIST_WRAPPER_KEYS: [&str; 4] = ["items", "results", "reports", "data"];

// =============================================================================
// Search
// =============================================================================

/// Response of the organization search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) content: Vec<SearchHit>,
    #[serde(default)]
    pub(crate) total_elements: u64,
}

/// One organization in a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchHit {
    pub(crate) id: Option<u64>,
    pub(crate) inn: Option<String>,
    /// May contain `<strong>` highlighting and HTML entities.
    #[serde(default)]
    pub(crate) short_name: String,
    pub(crate) ogrn: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) status_code: Option<String>,
}

// =============================================================================
// Reports
// =============================================================================

/// One filed report in the organization's report list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReport {
    #[serde(default)]
    pub(crate) period: Value,
    pub(crate) actual_bfo_date: Option<String>,
    #[serde(default)]
    pub(crate) type_corrections: Vec<TypeCorrection>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TypeCorrection {
    pub(crate) correction: Option<Correction>,
}

/// A version of a report body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Correction {
    pub(crate) correction_version: Option<i64>,
    #[serde(flatten)]
    pub(crate) sections: Map<String, Value>,
}

impl WireReport {
    /// Fiscal year of the report; the portal sends it as a string.
    pub(crate) fn fiscal_year(&self) -> Option<i32> {
        match &self.period {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            _ => None,
        }
    }

    pub(crate) fn filing_date(&self) -> Option<NaiveDate> {
        self.actual_bfo_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// Picks the correction with the highest version, the later one on ties.
    /// Without versions the first correction is used.
    pub(crate) fn best_correction(&self) -> Option<&Correction> {
        let mut best: Option<&Correction> = None;
        let mut best_version = -1;
        for correction in self.type_corrections.iter().filter_map(|tc| tc.correction.as_ref()) {
            match correction.correction_version {
                Some(version) if version >= best_version => {
                    best_version = version;
                    best = Some(correction);
                }
                _ if best.is_none() => best = Some(correction),
                _ => {}
            }
        }
        best
    }
}

/// Decodes the report list, unwrapping the shapes the portal has used.
pub(crate) fn decode_report_list(payload: Value) -> Result<Vec<WireReport>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            match LIST_WRAPPER_KEYS
                .iter()
                .find(|key| matches!(map.get(**key), Some(Value::Array(_))))
            {
                Some(key) => match map.remove(*key) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
                None => vec![Value::Object(map)],
            }
        }
        other => {
            return Err(BfoError::Parse(format!(
                "Unexpected report list payload: {other}"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| BfoError::Parse(format!("Failed to parse report: {e}")))
        })
        .collect()
}

/// Converts the report list into summaries, most recent fiscal year first.
pub(crate) fn summaries(organization_id: u64, reports: &[WireReport]) -> Vec<ReportSummary> {
    let mut summaries: Vec<ReportSummary> = reports
        .iter()
        .filter_map(|report| {
            let Some(year) = report.fiscal_year() else {
                warn!(period = %report.period, "Skipping report with unreadable period");
                return None;
            };
            let summary = ReportSummary::new(ReportRef::new(organization_id, year));
            Some(match report.filing_date() {
                Some(date) => summary.with_actual_bfo_date(date),
                None => summary,
            })
        })
        .collect();

    summaries.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
    summaries
}

/// Decodes a report body into forms, one per section with coded cells.
pub(crate) fn decode_forms(fiscal_year: i32, correction: &Correction) -> Vec<ReportForm> {
    correction
        .sections
        .iter()
        .filter_map(|(name, section)| match section {
            Value::Object(cells) => decode_section(name, fiscal_year, cells),
            _ => None,
        })
        .collect()
}

fn decode_section(name: &str, fiscal_year: i32, cells: &Map<String, Value>) -> Option<ReportForm> {
    let mut rows: Vec<ReportRow> = Vec::new();
    let mut columns = 0;

    for (key, value) in cells {
        let Some(captures) = CELL_KEY.captures(key) else {
            continue;
        };
        let column = match &captures[1] {
            "current" => 0,
            "previous" => 1,
            _ => 2,
        };
        let code = &captures[2];
        let cell = parse_cell(value, key);

        let index = match rows.iter().position(|r| r.code == code) {
            Some(index) => index,
            None => {
                let row = ReportRow::new(code, Vec::new());
                rows.push(match taxonomy::label(code) {
                    Some(label) => row.with_label(label),
                    None => row,
                });
                rows.len() - 1
            }
        };

        let values = &mut rows[index].values;
        if values.len() <= column {
            values.resize(column + 1, None);
        }
        values[column] = cell;
        columns = columns.max(column + 1);
    }

    if rows.is_empty() {
        return None;
    }

    debug!(section = name, rows = rows.len(), "Decoded report section");
    let periods = (0..columns).map(|offset| fiscal_year - offset as i32).collect();
    Some(ReportForm {
        name: name.to_string(),
        periods,
        rows,
    })
}

/// Parses a monetary cell. Null and blank cells are `None`.
fn parse_cell(value: &Value, key: &str) -> Option<Decimal> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            parse_decimal(&cleaned)
        }
        _ => None,
    };

    if parsed.is_none() {
        warn!(key, value = %value, "Ignoring non-numeric report cell");
    }
    parsed
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
