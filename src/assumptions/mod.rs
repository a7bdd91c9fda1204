//! Valuation assumptions, held as human-readable percentages

mod input;

pub use input::parse_percentage;

use crate::company::{CompanyFinancials, DefaultAssumptions};
use crate::error::ValuationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Forecast horizon used when none is given
pub const DEFAULT_FORECAST_YEARS: u32 = 5;

/// Longest forecast horizon accepted from user input
pub const MAX_FORECAST_YEARS: u32 = 100;

/// Container for all valuation assumptions.
///
/// Every rate is a percentage (`8.5` means 8.5%). The engine divides by 100
/// internally; nothing outside it sees a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub revenue_growth_pct: f64,
    pub ebit_margin_pct: f64,
    pub tax_rate_pct: f64,
    /// D&A as % of revenue
    pub da_pct: f64,
    /// CapEx as % of revenue
    pub capex_pct: f64,
    /// Change in NWC as % of revenue
    pub change_nwc_pct: f64,
    pub wacc_pct: f64,
    pub terminal_growth_pct: f64,
    /// Number of explicit forecast years
    #[serde(default = "default_forecast_years")]
    pub forecast_years: u32,
}

fn default_forecast_years() -> u32 {
    DEFAULT_FORECAST_YEARS
}

impl Assumptions {
    /// Assumptions pre-populated from a default bundle
    pub fn from_defaults(defaults: &DefaultAssumptions) -> Self {
        Self {
            revenue_growth_pct: defaults.growth,
            ebit_margin_pct: defaults.ebit_margin,
            tax_rate_pct: defaults.tax_rate,
            da_pct: defaults.da_pct,
            capex_pct: defaults.capex_pct,
            change_nwc_pct: defaults.change_nwc_pct,
            wacc_pct: defaults.wacc,
            terminal_growth_pct: defaults.terminal_growth,
            forecast_years: DEFAULT_FORECAST_YEARS,
        }
    }

    /// Company's default assumptions over the default horizon
    pub fn for_company(company: &CompanyFinancials) -> Self {
        Self::from_defaults(&company.defaults)
    }

    /// Copy with only WACC and terminal growth replaced
    pub fn with_discounting(&self, wacc_pct: f64, terminal_growth_pct: f64) -> Self {
        Self {
            wacc_pct,
            terminal_growth_pct,
            ..*self
        }
    }

    /// Copy with a different forecast horizon
    pub fn with_forecast_years(&self, forecast_years: u32) -> Self {
        Self {
            forecast_years,
            ..*self
        }
    }

    pub fn get(&self, field: AssumptionField) -> f64 {
        match field {
            AssumptionField::RevenueGrowth => self.revenue_growth_pct,
            AssumptionField::EbitMargin => self.ebit_margin_pct,
            AssumptionField::TaxRate => self.tax_rate_pct,
            AssumptionField::DaPct => self.da_pct,
            AssumptionField::CapexPct => self.capex_pct,
            AssumptionField::ChangeNwcPct => self.change_nwc_pct,
            AssumptionField::Wacc => self.wacc_pct,
            AssumptionField::TerminalGrowth => self.terminal_growth_pct,
        }
    }

    /// Copy with one percentage field replaced
    pub fn with(&self, field: AssumptionField, value: f64) -> Self {
        let mut next = *self;
        let slot = match field {
            AssumptionField::RevenueGrowth => &mut next.revenue_growth_pct,
            AssumptionField::EbitMargin => &mut next.ebit_margin_pct,
            AssumptionField::TaxRate => &mut next.tax_rate_pct,
            AssumptionField::DaPct => &mut next.da_pct,
            AssumptionField::CapexPct => &mut next.capex_pct,
            AssumptionField::ChangeNwcPct => &mut next.change_nwc_pct,
            AssumptionField::Wacc => &mut next.wacc_pct,
            AssumptionField::TerminalGrowth => &mut next.terminal_growth_pct,
        };
        *slot = value;
        next
    }
}

/// One of the eight percentage inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionField {
    RevenueGrowth,
    EbitMargin,
    TaxRate,
    DaPct,
    CapexPct,
    ChangeNwcPct,
    Wacc,
    TerminalGrowth,
}

impl AssumptionField {
    pub const ALL: [AssumptionField; 8] = [
        AssumptionField::RevenueGrowth,
        AssumptionField::EbitMargin,
        AssumptionField::TaxRate,
        AssumptionField::DaPct,
        AssumptionField::CapexPct,
        AssumptionField::ChangeNwcPct,
        AssumptionField::Wacc,
        AssumptionField::TerminalGrowth,
    ];

    /// Machine key, as used by the CLI and JSON requests
    pub fn key(&self) -> &'static str {
        match self {
            AssumptionField::RevenueGrowth => "revenue_growth",
            AssumptionField::EbitMargin => "ebit_margin",
            AssumptionField::TaxRate => "tax_rate",
            AssumptionField::DaPct => "da_pct",
            AssumptionField::CapexPct => "capex_pct",
            AssumptionField::ChangeNwcPct => "change_nwc_pct",
            AssumptionField::Wacc => "wacc",
            AssumptionField::TerminalGrowth => "terminal_growth",
        }
    }

    /// Input label
    pub fn label(&self) -> &'static str {
        match self {
            AssumptionField::RevenueGrowth => "Revenue growth (%)",
            AssumptionField::EbitMargin => "EBIT margin (%)",
            AssumptionField::TaxRate => "Tax rate (%)",
            AssumptionField::DaPct => "D&A (% of revenue)",
            AssumptionField::CapexPct => "CapEx (% of revenue)",
            AssumptionField::ChangeNwcPct => "Δ NWC (% of revenue)",
            AssumptionField::Wacc => "WACC (%)",
            AssumptionField::TerminalGrowth => "Terminal growth (%)",
        }
    }
}

impl fmt::Display for AssumptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

impl FromStr for AssumptionField {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        AssumptionField::ALL
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .ok_or_else(|| ValuationError::UnknownAssumption { key: s.to_string() })
    }
}
