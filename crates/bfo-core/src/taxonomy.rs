//! Report row-code taxonomies.
//!
//! Row codes are reused across versions of the Russian accounting forms with
//! different meanings, so every lookup goes through [`TAXONOMIES`]: a fixed
//! table tried in priority order, newest format first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A version of the report row-code scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Taxonomy {
    /// Forms approved by Order 66n (reports from 2011 onwards).
    Rsbu2011,
    /// Form No. 2 approved by Order 67n (reports up to 2010).
    Rsbu2003,
}

impl Taxonomy {
    /// Returns the code table for this taxonomy.
    #[must_use]
    pub fn codes(self) -> &'static TaxonomyCodes {
        match self {
            Self::Rsbu2011 => &TAXONOMIES[0],
            Self::Rsbu2003 => &TAXONOMIES[1],
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsbu2011 => write!(f, "RSBU 2011 (Order 66n)"),
            Self::Rsbu2003 => write!(f, "RSBU 2003 (Order 67n)"),
        }
    }
}

/// A row code with its statement label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCode {
    /// Code as it appears in the report.
    pub code: &'static str,
    /// Label of the line in the statement.
    pub label: &'static str,
}

impl RowCode {
    const fn new(code: &'static str, label: &'static str) -> Self {
        Self { code, label }
    }
}

/// Revenue and profit row codes of one taxonomy, each in lookup order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaxonomyCodes {
    /// Taxonomy these codes belong to.
    pub taxonomy: Taxonomy,
    /// Name of the form the codes are read from. Other statements reuse
    /// the same codes for unrelated lines.
    pub form: &'static str,
    /// Revenue rows, highest priority first.
    pub revenue: &'static [RowCode],
    /// Profit rows, net profit first, then pre-tax, sales and gross profit.
    pub profit: &'static [RowCode],
}

impl TaxonomyCodes {
    /// Iterates over every revenue and profit code of this taxonomy.
    pub fn all(&self) -> impl Iterator<Item = &'static RowCode> + '_ {
        self.revenue.iter().chain(self.profit.iter())
    }
}

/// Form name of the income statement (profit and loss).
pub const INCOME_STATEMENT: &str = "financialResult";

/// Known taxonomies in priority order.
///
/// When a report contains rows of several taxonomies (transitional filings),
/// the first entry whose rows are present wins.
pub static TAXONOMIES: [TaxonomyCodes; 2] = [
    TaxonomyCodes {
        taxonomy: Taxonomy::Rsbu2011,
        form: INCOME_STATEMENT,
        revenue: &[RowCode::new("2110", "Выручка")],
        profit: &[
            RowCode::new("2400", "Чистая прибыль (убыток)"),
            RowCode::new("2300", "Прибыль (убыток) до налогообложения"),
            RowCode::new("2200", "Прибыль (убыток) от продаж"),
            RowCode::new("2100", "Валовая прибыль (убыток)"),
        ],
    },
    TaxonomyCodes {
        taxonomy: Taxonomy::Rsbu2003,
        form: INCOME_STATEMENT,
        revenue: &[RowCode::new(
            "010",
            "Выручка (нетто) от продажи товаров, продукции, работ, услуг",
        )],
        profit: &[
            RowCode::new("190", "Чистая прибыль (убыток) отчетного периода"),
            RowCode::new("140", "Прибыль (убыток) до налогообложения"),
            RowCode::new("050", "Прибыль (убыток) от продаж"),
            RowCode::new("029", "Валовая прибыль"),
        ],
    },
];

/// Looks up the statement label of a known code, newest taxonomy first.
#[must_use]
pub fn label(code: &str) -> Option<&'static str> {
    TAXONOMIES
        .iter()
        .flat_map(|t| t.all())
        .find(|rc| rc.code == code)
        .map(|rc| rc.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_variants() {
        assert_eq!(TAXONOMIES[0].taxonomy, Taxonomy::Rsbu2011);
        assert_eq!(TAXONOMIES[1].taxonomy, Taxonomy::Rsbu2003);
        for entry in &TAXONOMIES {
            assert_eq!(entry.taxonomy.codes(), entry);
        }
    }

    #[test]
    fn test_net_profit_is_preferred() {
        assert_eq!(Taxonomy::Rsbu2011.codes().profit[0].code, "2400");
        assert_eq!(Taxonomy::Rsbu2003.codes().profit[0].code, "190");
    }

    #[test]
    fn test_codes_do_not_overlap_between_taxonomies() {
        let newer: Vec<_> = TAXONOMIES[0].all().map(|rc| rc.code).collect();
        assert!(TAXONOMIES[1].all().all(|rc| !newer.contains(&rc.code)));
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(label("2110"), Some("Выручка"));
        assert!(label("190").is_some());
        assert!(label("9999").is_none());
    }
}
