//! Discounting helpers for annual cash flows and the Gordon terminal value
//!
//! All rates here are fractions (0.085 for 8.5%).

use serde::{Deserialize, Serialize};

/// Minimum spread kept between the discount rate and terminal growth
pub const TERMINAL_SPREAD_FLOOR: f64 = 0.005;

/// Discount rate actually used for an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRate {
    /// Annual rate applied to cash flows and the terminal value
    pub rate: f64,
    /// True when the requested rate was replaced by growth + floor
    pub adjusted: bool,
}

/// Resolve the discount rate, keeping it strictly above terminal growth.
///
/// A WACC at or below terminal growth would make the Gordon denominator zero
/// or negative, so it is replaced by `growth + TERMINAL_SPREAD_FLOOR`.
pub fn effective_discount_rate(wacc: f64, terminal_growth: f64) -> EffectiveRate {
    if wacc <= terminal_growth {
        EffectiveRate {
            rate: terminal_growth + TERMINAL_SPREAD_FLOOR,
            adjusted: true,
        }
    } else {
        EffectiveRate {
            rate: wacc,
            adjusted: false,
        }
    }
}

/// (1 + r)^years, saturating the exponent at `i32::MAX`
fn growth_factor(rate: f64, years: u32) -> f64 {
    (1.0 + rate).powi(i32::try_from(years).unwrap_or(i32::MAX))
}

/// Discount factor for a cash flow at the end of `year`: 1 / (1 + r)^year
pub fn discount_factor(rate: f64, year: u32) -> f64 {
    1.0 / growth_factor(rate, year)
}

/// Present value of an amount received at the end of `years`
pub fn present_value(amount: f64, rate: f64, years: u32) -> f64 {
    amount / growth_factor(rate, years)
}

/// Gordon growth terminal value at the end of the final forecast year
pub fn gordon_terminal_value(final_fcf: f64, rate: f64, terminal_growth: f64) -> f64 {
    (final_fcf * (1.0 + terminal_growth)) / (rate - terminal_growth)
}
