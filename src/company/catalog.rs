//! Fixed company catalog with identifier lookup

use super::data::{CompanyFinancials, CompanyId, DefaultAssumptions};
use crate::error::{Result, ValuationError};
use std::collections::HashSet;

/// Closed, ordered set of companies available for valuation
#[derive(Debug, Clone)]
pub struct Catalog {
    companies: Vec<CompanyFinancials>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers and empty input
    pub fn from_companies(companies: Vec<CompanyFinancials>) -> Result<Self> {
        if companies.is_empty() {
            return Err(ValuationError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for company in &companies {
            if !seen.insert(company.id.clone()) {
                return Err(ValuationError::DuplicateCompany {
                    id: company.id.to_string(),
                });
            }
        }

        Ok(Self { companies })
    }

    /// Built-in catalog (base year 2024, figures in millions USD, approximate)
    pub fn builtin() -> Self {
        Self {
            companies: vec![
                company(
                    "AAPL", "Apple Inc.", 2024,
                    [383_000.0, 119_000.0, 11_500.0, 10_000.0, 0.0],
                    [60_000.0, 98_000.0, 15_700.0],
                    [5.0, 30.0, 20.0, 3.0, 3.0, 1.0, 8.0, 2.0],
                ),
                company(
                    "AMZN", "Amazon.com, Inc.", 2024,
                    [575_000.0, 46_000.0, 30_000.0, 60_000.0, 5_000.0],
                    [80_000.0, 58_000.0, 10_500.0],
                    [8.0, 10.0, 21.0, 6.0, 9.0, 2.0, 9.0, 2.5],
                ),
                company(
                    "META", "Meta Platforms, Inc.", 2024,
                    [164_000.0, 70_000.0, 15_000.0, 37_000.0, -1_000.0],
                    [45_000.0, 0.0, 2_500.0],
                    [7.0, 40.0, 20.0, 6.0, 15.0, 1.0, 9.0, 2.5],
                ),
                company(
                    "NFLX", "Netflix, Inc.", 2024,
                    [33_700.0, 6_000.0, 300.0, 400.0, -300.0],
                    [8_000.0, 15_000.0, 430.0],
                    [9.0, 18.0, 20.0, 1.0, 2.0, 1.0, 9.5, 2.5],
                ),
                company(
                    "GOOGL", "Alphabet Inc.", 2024,
                    [307_000.0, 95_000.0, 15_000.0, 50_000.0, 0.0],
                    [100_000.0, 11_000.0, 12_200.0],
                    [6.0, 30.0, 18.0, 5.0, 12.0, 1.0, 8.5, 2.0],
                ),
            ],
        }
    }

    /// Look up a company by identifier
    pub fn get(&self, id: &CompanyId) -> Result<&CompanyFinancials> {
        self.companies
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ValuationError::UnknownCompany { id: id.to_string() })
    }

    /// First company in catalog order (the initial selection)
    pub fn first(&self) -> &CompanyFinancials {
        // from_companies and builtin both guarantee at least one entry
        &self.companies[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompanyFinancials> {
        self.companies.iter()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// [revenue, ebit, da, capex, change_nwc], [cash, debt, shares],
/// [growth, margin, tax, da%, capex%, nwc%, wacc, g]
fn company(
    ticker: &str,
    name: &str,
    base_year: i32,
    income: [f64; 5],
    balance: [f64; 3],
    defaults: [f64; 8],
) -> CompanyFinancials {
    let [revenue, ebit, da, capex, change_nwc] = income;
    let [cash, debt, shares_outstanding] = balance;
    let [growth, ebit_margin, tax_rate, da_pct, capex_pct, change_nwc_pct, wacc, terminal_growth] =
        defaults;

    CompanyFinancials {
        id: CompanyId::new(ticker),
        name: name.to_string(),
        ticker: ticker.to_string(),
        base_year,
        revenue,
        ebit,
        da,
        capex,
        change_nwc,
        cash,
        debt,
        shares_outstanding,
        defaults: DefaultAssumptions {
            growth,
            ebit_margin,
            tax_rate,
            da_pct,
            capex_pct,
            change_nwc_pct,
            wacc,
            terminal_growth,
        },
    }
}
