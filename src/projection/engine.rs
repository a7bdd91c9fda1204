//! Core DCF engine: annual FCF forecast, terminal value, EV, equity, per-share

use crate::assumptions::{Assumptions, MAX_FORECAST_YEARS};
use crate::company::CompanyFinancials;
use super::cashflows::{DcfResult, YearProjection};
use super::discount::{self, EffectiveRate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How tax is applied to EBIT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    /// EBIT * (1 - tax); negative EBIT produces a tax credit
    #[default]
    Linear,
    /// Tax expense floored at zero; losses pass through untaxed
    FloorAtZero,
}

/// Configuration for the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tax_treatment: TaxTreatment,
}

/// Assumptions converted to fractions
#[derive(Debug, Clone, Copy)]
struct Rates {
    growth: f64,
    ebit_margin: f64,
    tax_rate: f64,
    da: f64,
    capex: f64,
    change_nwc: f64,
    wacc: f64,
    terminal_growth: f64,
}

impl Rates {
    fn from_assumptions(a: &Assumptions) -> Self {
        Self {
            growth: a.revenue_growth_pct / 100.0,
            ebit_margin: a.ebit_margin_pct / 100.0,
            tax_rate: a.tax_rate_pct / 100.0,
            da: a.da_pct / 100.0,
            capex: a.capex_pct / 100.0,
            change_nwc: a.change_nwc_pct / 100.0,
            wacc: a.wacc_pct / 100.0,
            terminal_growth: a.terminal_growth_pct / 100.0,
        }
    }
}

/// Main valuation engine. Stateless apart from its configuration, so one
/// engine can be shared across threads and reused for any number of runs.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl ValuationEngine {
    /// Create a new engine with the given config
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a full DCF for one company under one set of assumptions
    pub fn evaluate(&self, company: &CompanyFinancials, assumptions: &Assumptions) -> DcfResult {
        let rates = Rates::from_assumptions(assumptions);
        let years = assumptions.forecast_years.min(MAX_FORECAST_YEARS);
        if years < assumptions.forecast_years {
            warn!(
                "{}: forecast horizon {} capped at {} years",
                company.id, assumptions.forecast_years, MAX_FORECAST_YEARS
            );
        }

        let EffectiveRate { rate: wacc, adjusted } =
            discount::effective_discount_rate(rates.wacc, rates.terminal_growth);
        if adjusted {
            debug!(
                "{}: WACC {:.4} <= terminal growth {:.4}, discounting at {:.4}",
                company.id, rates.wacc, rates.terminal_growth, wacc
            );
        }

        let mut projections = Vec::with_capacity(years as usize);
        let mut revenue = company.revenue;
        let mut pv_forecast_fcf = 0.0;

        for t in 1..=years {
            let row = self.project_year(company, &rates, wacc, t, revenue);
            revenue = row.revenue;
            pv_forecast_fcf += row.discounted_fcf;
            projections.push(row);
        }

        let final_fcf = projections.last().map(|r| r.fcf).unwrap_or(0.0);
        let terminal_value = discount::gordon_terminal_value(final_fcf, wacc, rates.terminal_growth);
        let discounted_terminal_value = discount::present_value(terminal_value, wacc, years);

        let enterprise_value = pv_forecast_fcf + discounted_terminal_value;
        let net_debt = company.net_debt();
        let equity_value = enterprise_value - net_debt;
        let implied_share_price = equity_value / company.shares_outstanding;

        DcfResult {
            projections,
            pv_forecast_fcf,
            terminal_value,
            discounted_terminal_value,
            enterprise_value,
            net_debt,
            equity_value,
            implied_share_price,
            effective_wacc_pct: wacc * 100.0,
            wacc_adjusted: adjusted,
        }
    }

    /// Forecast one year off the prior year's revenue
    fn project_year(
        &self,
        company: &CompanyFinancials,
        rates: &Rates,
        wacc: f64,
        t: u32,
        prior_revenue: f64,
    ) -> YearProjection {
        let revenue = prior_revenue * (1.0 + rates.growth);
        let ebit = revenue * rates.ebit_margin;
        let ebiat = self.after_tax(ebit, rates.tax_rate);
        let da = revenue * rates.da;
        let capex = revenue * rates.capex;
        let change_nwc = revenue * rates.change_nwc;
        let fcf = ebiat + da - capex - change_nwc;
        let discount_factor = discount::discount_factor(wacc, t);

        YearProjection {
            year_index: t,
            fiscal_year: company.base_year + t as i32,
            revenue,
            ebit,
            ebiat,
            da,
            capex,
            change_nwc,
            fcf,
            discount_factor,
            discounted_fcf: fcf * discount_factor,
        }
    }

    fn after_tax(&self, ebit: f64, tax_rate: f64) -> f64 {
        match self.config.tax_treatment {
            TaxTreatment::Linear => ebit * (1.0 - tax_rate),
            TaxTreatment::FloorAtZero => ebit - (ebit * tax_rate).max(0.0),
        }
    }
}

/// Evaluate with the default engine configuration
pub fn evaluate(company: &CompanyFinancials, assumptions: &Assumptions) -> DcfResult {
    ValuationEngine::default().evaluate(company, assumptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AssumptionField;
    use crate::company::{Catalog, CompanyId, DefaultAssumptions};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    fn unit_company() -> CompanyFinancials {
        CompanyFinancials {
            id: CompanyId::new("UNIT"),
            name: "Unit Test Co".to_string(),
            ticker: "UNIT".to_string(),
            base_year: 2024,
            revenue: 100.0,
            ebit: 20.0,
            da: 0.0,
            capex: 0.0,
            change_nwc: 0.0,
            cash: 0.0,
            debt: 0.0,
            shares_outstanding: 10.0,
            defaults: DefaultAssumptions {
                growth: 10.0,
                ebit_margin: 20.0,
                tax_rate: 25.0,
                da_pct: 0.0,
                capex_pct: 0.0,
                change_nwc_pct: 0.0,
                wacc: 10.0,
                terminal_growth: 2.0,
            },
        }
    }

    fn aapl() -> (CompanyFinancials, Assumptions) {
        let catalog = Catalog::builtin();
        let company = catalog.first().clone();
        let assumptions = Assumptions::for_company(&company);
        (company, assumptions)
    }

    #[test]
    fn test_single_year_scenario() {
        let company = unit_company();
        let assumptions = Assumptions::for_company(&company).with_forecast_years(1);

        let result = evaluate(&company, &assumptions);
        assert_eq!(result.projections.len(), 1);

        let y1 = &result.projections[0];
        assert_eq!(y1.year_index, 1);
        assert_eq!(y1.fiscal_year, 2025);
        assert_relative_eq!(y1.revenue, 110.0, epsilon = 1e-9);
        assert_relative_eq!(y1.ebit, 22.0, epsilon = 1e-9);
        assert_relative_eq!(y1.ebiat, 16.5, epsilon = 1e-9);
        assert_relative_eq!(y1.fcf, 16.5, epsilon = 1e-9);
        assert_relative_eq!(y1.discounted_fcf, 15.0, epsilon = 1e-9);

        assert_relative_eq!(result.terminal_value, 210.375, epsilon = 1e-9);
        assert_relative_eq!(result.discounted_terminal_value, 191.25, epsilon = 1e-9);
        assert_relative_eq!(result.enterprise_value, 206.25, epsilon = 1e-9);
        assert_relative_eq!(result.net_debt, 0.0);
        assert_relative_eq!(result.equity_value, 206.25, epsilon = 1e-9);
        assert_relative_eq!(result.implied_share_price, 20.625, epsilon = 1e-9);
        assert!(!result.wacc_adjusted);
        assert_relative_eq!(result.effective_wacc_pct, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_revenue_compounds_from_base() {
        let (company, assumptions) = aapl();
        let result = evaluate(&company, &assumptions);

        assert_eq!(result.projections.len(), 5);
        let mut expected = company.revenue;
        for (i, row) in result.projections.iter().enumerate() {
            expected *= 1.05;
            assert_eq!(row.year_index, i as u32 + 1);
            assert_relative_eq!(row.revenue, expected, max_relative = 1e-12);
            assert_relative_eq!(row.ebit, row.revenue * 0.30, max_relative = 1e-12);
            assert_relative_eq!(
                row.fcf,
                row.ebiat + row.da - row.capex - row.change_nwc,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_enterprise_value_identity() {
        let (company, assumptions) = aapl();
        let result = evaluate(&company, &assumptions);

        let sum: f64 = result.projections.iter().map(|r| r.discounted_fcf).sum();
        assert_relative_eq!(result.pv_forecast_fcf, sum, max_relative = 1e-12);
        assert_relative_eq!(
            result.enterprise_value,
            sum + result.discounted_terminal_value,
            max_relative = 1e-9
        );
        assert_relative_eq!(result.equity_value, result.enterprise_value - (98_000.0 - 60_000.0));
        assert_relative_eq!(
            result.implied_share_price,
            result.equity_value / company.shares_outstanding
        );
    }

    #[test]
    fn test_discount_factors_decrease() {
        let (company, assumptions) = aapl();
        let result = evaluate(&company, &assumptions);

        for row in &result.projections {
            assert_relative_eq!(
                row.discount_factor,
                1.0 / 1.08_f64.powi(row.year_index as i32),
                max_relative = 1e-12
            );
        }
        for pair in result.projections.windows(2) {
            assert!(pair[1].discount_factor < pair[0].discount_factor);
        }
    }

    #[test]
    fn test_idempotent() {
        let (company, assumptions) = aapl();
        let engine = ValuationEngine::default();
        assert_eq!(engine.evaluate(&company, &assumptions), engine.evaluate(&company, &assumptions));
    }

    #[test]
    fn test_guard_when_wacc_below_growth() {
        let (company, assumptions) = aapl();
        let assumptions = assumptions.with_discounting(8.0, 9.0);

        let result = evaluate(&company, &assumptions);
        assert!(result.wacc_adjusted);
        assert_relative_eq!(result.effective_wacc_pct, 9.5, epsilon = 1e-9);
        assert!(result.terminal_value.is_finite() && result.terminal_value > 0.0);
        assert!(result.implied_share_price.is_finite());
        for row in &result.projections {
            assert_relative_eq!(
                row.discount_factor,
                1.0 / 1.095_f64.powi(row.year_index as i32),
                max_relative = 1e-9
            );
        }

        // caller's assumptions are untouched
        assert_eq!(assumptions.wacc_pct, 8.0);
    }

    #[test]
    fn test_guard_when_wacc_equals_growth() {
        let (company, assumptions) = aapl();
        let result = evaluate(&company, &assumptions.with_discounting(3.0, 3.0));
        assert!(result.wacc_adjusted);
        assert_relative_eq!(result.effective_wacc_pct, 3.5, epsilon = 1e-9);
        assert!(result.terminal_value.is_finite());
    }

    #[test]
    fn test_price_falls_as_wacc_rises() {
        let (company, assumptions) = aapl();
        let prices: Vec<f64> = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0]
            .iter()
            .map(|&w| evaluate(&company, &assumptions.with_discounting(w, 2.0)).implied_share_price)
            .collect();

        for pair in prices.windows(2) {
            assert!(pair[1] < pair[0], "{:?}", prices);
        }
    }

    #[test]
    fn test_zero_horizon() {
        let (company, assumptions) = aapl();
        let result = evaluate(&company, &assumptions.with_forecast_years(0));

        assert!(result.projections.is_empty());
        assert!(result.final_year().is_none());
        assert_eq!(result.terminal_value, 0.0);
        assert_eq!(result.enterprise_value, 0.0);
        assert_relative_eq!(result.equity_value, -38_000.0);
    }

    #[test]
    fn test_horizon_capped() {
        let (company, assumptions) = aapl();
        let capped = evaluate(&company, &assumptions.with_forecast_years(u32::MAX));
        let longest = evaluate(&company, &assumptions.with_forecast_years(MAX_FORECAST_YEARS));

        assert_eq!(capped.projections.len(), MAX_FORECAST_YEARS as usize);
        assert_eq!(capped, longest);
        assert!(capped.implied_share_price.is_finite());
    }

    #[test]
    fn test_zero_shares_gives_non_finite_price() {
        let (mut company, assumptions) = aapl();
        company.shares_outstanding = 0.0;
        let result = evaluate(&company, &assumptions);
        assert!(result.equity_value.is_finite());
        assert!(!result.implied_share_price.is_finite());
    }

    #[test]
    fn test_net_cash_adds_to_equity() {
        let catalog = Catalog::builtin();
        let meta = catalog.get(&CompanyId::new("META")).unwrap();
        let result = evaluate(meta, &Assumptions::for_company(meta));
        assert_eq!(result.net_debt, -45_000.0);
        assert_relative_eq!(result.equity_value, result.enterprise_value + 45_000.0);
    }

    #[test]
    fn test_tax_treatment_on_losses() {
        let company = unit_company();
        let losing = Assumptions::for_company(&company)
            .with_forecast_years(1)
            .with(AssumptionField::EbitMargin, -10.0);

        let linear = evaluate(&company, &losing);
        let floored = ValuationEngine::new(EngineConfig {
            tax_treatment: TaxTreatment::FloorAtZero,
        })
        .evaluate(&company, &losing);

        // -11 EBIT: linear gives a 2.75 credit, floored passes the loss through
        assert_relative_eq!(linear.projections[0].ebiat, -8.25, epsilon = 1e-9);
        assert_relative_eq!(floored.projections[0].ebiat, -11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tax_treatment_same_on_profits() {
        let (company, assumptions) = aapl();
        let floored = ValuationEngine::new(EngineConfig {
            tax_treatment: TaxTreatment::FloorAtZero,
        });
        let a = evaluate(&company, &assumptions);
        let b = floored.evaluate(&company, &assumptions);
        assert_abs_diff_eq!(a.implied_share_price, b.implied_share_price, epsilon = 1e-9);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_enterprise_value_identity(
            growth_bp in -1000i32..3000,
            margin_bp in 0i32..6000,
            tax_bp in 0i32..4000,
            wacc_bp in 300i32..2000,
            g_bp in -200i32..500,
            years in 1u32..15,
        ) {
            prop_assume!(wacc_bp > g_bp);
            let company = unit_company();
            let assumptions = Assumptions::for_company(&company)
                .with(AssumptionField::RevenueGrowth, growth_bp as f64 / 100.0)
                .with(AssumptionField::EbitMargin, margin_bp as f64 / 100.0)
                .with(AssumptionField::TaxRate, tax_bp as f64 / 100.0)
                .with_discounting(wacc_bp as f64 / 100.0, g_bp as f64 / 100.0)
                .with_forecast_years(years);

            let result = evaluate(&company, &assumptions);
            let sum: f64 = result.projections.iter().map(|r| r.discounted_fcf).sum();
            let expected = sum + result.discounted_terminal_value;
            let scale = expected.abs().max(1.0);
            prop_assert!(((result.enterprise_value - expected) / scale).abs() <= 1e-9);
            prop_assert!(!result.wacc_adjusted);
        }

        #[test]
        fn prop_discount_factors_match_formula(
            wacc_bp in 1i32..3000,
            g_bp in -500i32..1500,
            years in 1u32..20,
        ) {
            let company = unit_company();
            let assumptions = Assumptions::for_company(&company)
                .with_discounting(wacc_bp as f64 / 100.0, g_bp as f64 / 100.0)
                .with_forecast_years(years);

            let result = evaluate(&company, &assumptions);
            let rate = result.effective_wacc_pct / 100.0;
            for row in &result.projections {
                let expected = 1.0 / (1.0 + rate).powi(row.year_index as i32);
                prop_assert!((row.discount_factor - expected).abs() <= 1e-12);
            }
            if rate > 0.0 {
                for pair in result.projections.windows(2) {
                    prop_assert!(pair[1].discount_factor < pair[0].discount_factor);
                }
            }
            prop_assert!(result.terminal_value.is_finite());
        }
    }
}
