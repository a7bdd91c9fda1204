//! Forecast rows and valuation output structures

use serde::{Deserialize, Serialize};

/// A single forecast year (amounts in millions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    /// 1-indexed forecast year
    pub year_index: u32,
    /// Fiscal year label (base year + year_index)
    pub fiscal_year: i32,

    pub revenue: f64,
    pub ebit: f64,
    /// After-tax operating profit
    pub ebiat: f64,
    pub da: f64,
    pub capex: f64,
    pub change_nwc: f64,

    /// Unlevered free cash flow: EBIAT + D&A - CapEx - ΔNWC
    pub fcf: f64,
    pub discount_factor: f64,
    pub discounted_fcf: f64,
}

/// Complete valuation result (amounts in millions, price per share in currency)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Forecast rows, years 1..N
    pub projections: Vec<YearProjection>,

    /// Sum of discounted forecast FCFs
    pub pv_forecast_fcf: f64,

    /// Terminal value at the end of year N (undiscounted)
    pub terminal_value: f64,
    pub discounted_terminal_value: f64,

    pub enterprise_value: f64,
    pub net_debt: f64,
    pub equity_value: f64,
    pub implied_share_price: f64,

    /// Discount rate used, in percent
    pub effective_wacc_pct: f64,
    /// Whether the WACC was raised above terminal growth
    pub wacc_adjusted: bool,
}

impl DcfResult {
    /// Final forecast year, if the horizon is non-empty
    pub fn final_year(&self) -> Option<&YearProjection> {
        self.projections.last()
    }

    /// Share of enterprise value coming from the terminal value
    pub fn terminal_value_weight(&self) -> f64 {
        self.discounted_terminal_value / self.enterprise_value
    }
}
