//! Company records: base-year financials plus default modeling assumptions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier for a company (upper-case ticker)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Normalize an identifier: surrounding whitespace dropped, upper-cased
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Default assumption percentages used to pre-populate the inputs
/// (whole-number percentages, e.g. `8.5` = 8.5%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultAssumptions {
    pub growth: f64,
    pub ebit_margin: f64,
    pub tax_rate: f64,
    pub da_pct: f64,
    pub capex_pct: f64,
    pub change_nwc_pct: f64,
    pub wacc: f64,
    pub terminal_growth: f64,
}

/// Base-year financials for one company.
///
/// Monetary amounts are in millions; shares outstanding are in millions too,
/// so equity value / shares gives a per-share price directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Catalog identifier
    pub id: CompanyId,

    /// Display name
    pub name: String,

    /// Exchange ticker
    pub ticker: String,

    /// Fiscal year the base figures belong to
    pub base_year: i32,

    // Base-year financials (millions)
    pub revenue: f64,
    pub ebit: f64,
    pub da: f64,
    pub capex: f64,
    pub change_nwc: f64,

    // Balance sheet (millions)
    pub cash: f64,
    pub debt: f64,

    /// Shares outstanding (millions)
    pub shares_outstanding: f64,

    /// Defaults for the assumption inputs
    pub defaults: DefaultAssumptions,
}

impl CompanyFinancials {
    /// Net debt = debt - cash (negative for a net-cash position)
    pub fn net_debt(&self) -> f64 {
        self.debt - self.cash
    }

    /// Base-year EBIT margin in percent
    pub fn base_ebit_margin_pct(&self) -> f64 {
        if self.revenue == 0.0 {
            0.0
        } else {
            self.ebit / self.revenue * 100.0
        }
    }
}
