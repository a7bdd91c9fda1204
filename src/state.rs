//! Application state: selected company and current assumptions
//!
//! State is a plain value. Every change goes through [`reduce`], which
//! returns a new state and leaves the old one untouched.

use crate::assumptions::{parse_percentage, AssumptionField, Assumptions, MAX_FORECAST_YEARS};
use crate::company::{Catalog, CompanyFinancials, CompanyId};
use crate::error::{Result, ValuationError};
use crate::projection::DcfResult;
use crate::sensitivity::{SensitivityBuilder, SensitivityGrid};
use log::warn;
use serde::{Deserialize, Serialize};

/// Selected company plus the assumptions currently applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub selected: CompanyId,
    pub assumptions: Assumptions,
}

/// A single user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch company; assumptions reset to its defaults
    SelectCompany(CompanyId),
    /// Free-form text typed into one assumption input
    SetAssumption { field: AssumptionField, input: String },
    /// Forecast horizon, at most `MAX_FORECAST_YEARS`
    SetForecastYears(u32),
    /// Restore the selected company's default assumptions
    ResetToDefaults,
}

impl AppState {
    /// First catalog company with its default assumptions
    pub fn initial(catalog: &Catalog) -> Self {
        let company = catalog.first();
        Self {
            selected: company.id.clone(),
            assumptions: Assumptions::for_company(company),
        }
    }

    /// State for a specific company at its defaults
    pub fn for_company(catalog: &Catalog, id: &CompanyId) -> Result<Self> {
        let company = catalog.get(id)?;
        Ok(Self {
            selected: company.id.clone(),
            assumptions: Assumptions::for_company(company),
        })
    }

    pub fn company<'a>(&self, catalog: &'a Catalog) -> Result<&'a CompanyFinancials> {
        catalog.get(&self.selected)
    }

    /// Evaluate the current state: forecast, valuation and sensitivity grid.
    ///
    /// The direct result and every grid cell come from the builder's engine.
    pub fn valuation(&self, catalog: &Catalog, grid: &SensitivityBuilder) -> Result<Valuation> {
        let company = self.company(catalog)?;
        Ok(Valuation {
            company: company.clone(),
            assumptions: self.assumptions,
            result: grid.engine().evaluate(company, &self.assumptions),
            sensitivity: grid.build(company, &self.assumptions),
        })
    }
}

/// Everything a view needs for one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub company: CompanyFinancials,
    pub assumptions: Assumptions,
    pub result: DcfResult,
    pub sensitivity: SensitivityGrid,
}

/// Apply an action to a state, producing the next state.
///
/// Unknown company identifiers are errors. Text that does not parse as a
/// number is not: the prior value is kept and the state is returned as is.
pub fn reduce(catalog: &Catalog, state: &AppState, action: Action) -> Result<AppState> {
    match action {
        Action::SelectCompany(id) => {
            let company = catalog.get(&id)?;
            Ok(AppState {
                selected: company.id.clone(),
                assumptions: Assumptions::for_company(company)
                    .with_forecast_years(state.assumptions.forecast_years),
            })
        }
        Action::SetAssumption { field, input } => match parse_percentage(&input) {
            Ok(value) => Ok(AppState {
                selected: state.selected.clone(),
                assumptions: state.assumptions.with(field, value),
            }),
            Err(ValuationError::InvalidNumber { input }) => {
                warn!(
                    "ignoring {} input {:?}: not a number, keeping {}",
                    field,
                    input,
                    state.assumptions.get(field)
                );
                Ok(state.clone())
            }
            Err(e) => Err(e),
        },
        Action::SetForecastYears(years) if years > MAX_FORECAST_YEARS => {
            Err(ValuationError::InvalidHorizon {
                years,
                max: MAX_FORECAST_YEARS,
            })
        }
        Action::SetForecastYears(years) => Ok(AppState {
            selected: state.selected.clone(),
            assumptions: state.assumptions.with_forecast_years(years),
        }),
        Action::ResetToDefaults => {
            let company = state.company(catalog)?;
            Ok(AppState {
                selected: state.selected.clone(),
                assumptions: Assumptions::for_company(company)
                    .with_forecast_years(state.assumptions.forecast_years),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{EngineConfig, TaxTreatment, ValuationEngine};
    use crate::sensitivity::GridSpec;

    fn set(field: AssumptionField, input: &str) -> Action {
        Action::SetAssumption {
            field,
            input: input.to_string(),
        }
    }

    #[test]
    fn test_initial_state() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);
        assert_eq!(state.selected, CompanyId::new("AAPL"));
        assert_eq!(state.assumptions.wacc_pct, 8.0);
    }

    #[test]
    fn test_set_assumption_parses_text() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);

        let next = reduce(&catalog, &state, set(AssumptionField::Wacc, "9.25")).unwrap();
        assert_eq!(next.assumptions.wacc_pct, 9.25);
        assert_eq!(state.assumptions.wacc_pct, 8.0);

        let next = reduce(&catalog, &next, set(AssumptionField::RevenueGrowth, "1,2")).unwrap();
        assert_eq!(next.assumptions.revenue_growth_pct, 12.0);
    }

    #[test]
    fn test_non_numeric_input_keeps_prior_value() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);

        let next = reduce(&catalog, &state, set(AssumptionField::TaxRate, "twenty")).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_select_company_resets_assumptions() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);
        let state = reduce(&catalog, &state, set(AssumptionField::Wacc, "15")).unwrap();
        let state = reduce(&catalog, &state, Action::SetForecastYears(7)).unwrap();

        let next = reduce(&catalog, &state, Action::SelectCompany(CompanyId::new("nflx"))).unwrap();
        assert_eq!(next.selected, CompanyId::new("NFLX"));
        assert_eq!(next.assumptions.wacc_pct, 9.5);
        assert_eq!(next.assumptions.terminal_growth_pct, 2.5);
        assert_eq!(next.assumptions.forecast_years, 7);
    }

    #[test]
    fn test_select_unknown_company_fails() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);
        let err = reduce(&catalog, &state, Action::SelectCompany(CompanyId::new("TSLA"))).unwrap_err();
        assert!(matches!(err, ValuationError::UnknownCompany { .. }));
    }

    #[test]
    fn test_reset_to_defaults() {
        let catalog = Catalog::builtin();
        let state = AppState::for_company(&catalog, &CompanyId::new("META")).unwrap();
        let edited = reduce(&catalog, &state, set(AssumptionField::CapexPct, "30")).unwrap();
        assert_ne!(edited, state);

        let reset = reduce(&catalog, &edited, Action::ResetToDefaults).unwrap();
        assert_eq!(reset, state);
    }

    #[test]
    fn test_valuation_view() {
        let catalog = Catalog::builtin();
        let state = AppState::for_company(&catalog, &CompanyId::new("GOOGL")).unwrap();
        let grid = SensitivityBuilder::new(ValuationEngine::default(), GridSpec::default()).unwrap();

        let view = state.valuation(&catalog, &grid).unwrap();
        assert_eq!(view.company.ticker, "GOOGL");
        assert_eq!(view.result.projections.len(), 5);
        assert_eq!(view.sensitivity.center().share_price, view.result.implied_share_price);
    }

    #[test]
    fn test_forecast_years_bounded() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);

        let longest = reduce(&catalog, &state, Action::SetForecastYears(MAX_FORECAST_YEARS)).unwrap();
        assert_eq!(longest.assumptions.forecast_years, MAX_FORECAST_YEARS);

        for years in [MAX_FORECAST_YEARS + 1, u32::MAX] {
            let err = reduce(&catalog, &state, Action::SetForecastYears(years)).unwrap_err();
            assert!(matches!(
                err,
                ValuationError::InvalidHorizon { years: y, max: MAX_FORECAST_YEARS } if y == years
            ));
        }
    }

    #[test]
    fn test_valuation_uses_one_engine_for_result_and_grid() {
        let catalog = Catalog::builtin();
        let state = AppState::initial(&catalog);
        let losing = reduce(&catalog, &state, set(AssumptionField::EbitMargin, "-10")).unwrap();

        let floored = ValuationEngine::new(EngineConfig {
            tax_treatment: TaxTreatment::FloorAtZero,
        });
        let grid = SensitivityBuilder::new(floored, GridSpec::default()).unwrap();
        let view = losing.valuation(&catalog, &grid).unwrap();

        assert_eq!(view.sensitivity.center().share_price, view.result.implied_share_price);

        let linear = ValuationEngine::default().evaluate(catalog.first(), &losing.assumptions);
        assert_ne!(view.result.implied_share_price, linear.implied_share_price);
    }
}
