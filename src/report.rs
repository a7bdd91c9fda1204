//! Text rendering of valuation output
//!
//! Monetary amounts print as millions with one decimal (`383,000.0M`),
//! per-share prices with two decimals (`$123.45`), rates with one decimal
//! (`8.5%`). Non-finite numbers print as [`UNAVAILABLE`]. Values exactly
//! halfway between two outputs round to the even digit (`0.25` -> `0.2`).

use crate::company::CompanyFinancials;
use crate::projection::DcfResult;
use crate::sensitivity::SensitivityGrid;
use std::fmt;

/// Marker shown instead of NaN or infinity
pub const UNAVAILABLE: &str = "—";

/// Insert thousands separators into a fixed-point number string
fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Amount in millions: `1,234.5M`
pub fn format_millions(n: f64) -> String {
    if !n.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format!("{}M", group_thousands(&format!("{:.1}", n)))
}

/// Per-share amount: `$1,234.56`
pub fn format_dollars(n: f64) -> String {
    if !n.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format!("${}", group_thousands(&format!("{:.2}", n)))
}

/// Percentage rounded to one decimal: `8.5%`
pub fn format_rate(pct: f64) -> String {
    if !pct.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format!("{:.1}%", pct)
}

/// Share count in millions, at most two decimals: `15,700M`, `12.25M`
pub fn format_shares(n: f64) -> String {
    if !n.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let fixed = format!("{:.2}", n);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{}M", group_thousands(trimmed))
}

/// Company panel: base year, headline financials, share count
pub struct CompanyPanel<'a>(pub &'a CompanyFinancials);

impl fmt::Display for CompanyPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        writeln!(f, "{} ({})", c.name, c.ticker)?;
        writeln!(f, "  Base year: {}", c.base_year)?;
        writeln!(f, "  Revenue: {} · EBIT: {}", format_millions(c.revenue), format_millions(c.ebit))?;
        writeln!(f, "  Cash: {} · Debt: {}", format_millions(c.cash), format_millions(c.debt))?;
        writeln!(f, "  Shares outstanding: {}", format_shares(c.shares_outstanding))
    }
}

/// Year-by-year forecast table
pub struct ForecastTable<'a>(pub &'a DcfResult);

impl fmt::Display for ForecastTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = &self.0.projections;

        write!(f, "{:<16}", "Item")?;
        for row in rows {
            write!(f, "{:>14}", format!("FY{}", row.fiscal_year))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(16 + 14 * rows.len()))?;

        let lines: [(&str, fn(&crate::projection::YearProjection) -> f64); 8] = [
            ("Revenue", |r| r.revenue),
            ("EBIT", |r| r.ebit),
            ("EBIAT", |r| r.ebiat),
            ("D&A", |r| r.da),
            ("CapEx", |r| r.capex),
            ("Δ NWC", |r| r.change_nwc),
            ("FCF", |r| r.fcf),
            ("Discounted FCF", |r| r.discounted_fcf),
        ];

        for (label, value) in lines {
            write!(f, "{:<16}", label)?;
            for row in rows {
                write!(f, "{:>14}", format_millions(value(row)))?;
            }
            writeln!(f)?;
        }

        write!(f, "{:<16}", "Discount factor")?;
        for row in rows {
            write!(f, "{:>14.4}", row.discount_factor)?;
        }
        writeln!(f)
    }
}

/// Valuation bridge from PV of cash flows to price per share
pub struct ValuationSummary<'a>(pub &'a DcfResult);

impl fmt::Display for ValuationSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "{:<26}{:>18}", "PV of forecast FCFs", format_millions(r.pv_forecast_fcf))?;
        writeln!(f, "{:<26}{:>18}", "Terminal value (PV)", format_millions(r.discounted_terminal_value))?;
        writeln!(f, "{:<26}{:>18}", "Enterprise value (EV)", format_millions(r.enterprise_value))?;
        writeln!(f, "{:<26}{:>18}", "Net debt (debt – cash)", format_millions(r.net_debt))?;
        writeln!(f, "{:<26}{:>18}", "Equity value", format_millions(r.equity_value))?;
        writeln!(f, "{:<26}{:>18}", "Implied price / share", format_dollars(r.implied_share_price))?;

        let weight = r.terminal_value_weight() * 100.0;
        writeln!(f, "{:<26}{:>18}", "Terminal value % of EV", format_rate(weight))?;

        if r.wacc_adjusted {
            writeln!(
                f,
                "Note: WACC at or below terminal growth; discounted at {}",
                format_rate(r.effective_wacc_pct)
            )?;
        }
        Ok(())
    }
}

/// WACC (rows) by terminal growth (columns); the base cell is bracketed
pub struct GridTable<'a>(pub &'a SensitivityGrid);

impl fmt::Display for GridTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.0;

        write!(f, "{:<14}", "WACC ↓ / g →")?;
        for g in &grid.terminal_growth_rates {
            write!(f, "{:>14}", format_rate(*g))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(14 + 14 * grid.cols()))?;

        for (wacc, row) in grid.wacc_rates.iter().zip(&grid.cells) {
            write!(f, "{:<14}", format_rate(*wacc))?;
            for cell in row {
                let price = format_dollars(cell.share_price);
                if cell.is_base {
                    write!(f, "{:>14}", format!("[{}]", price))?;
                } else {
                    write!(f, "{:>14}", price)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
