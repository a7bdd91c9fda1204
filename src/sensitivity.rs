//! WACC x terminal growth sensitivity grid
//!
//! Re-runs the full valuation for every (WACC, terminal growth) pair around
//! the base case, holding every other assumption fixed. Nothing is cached
//! between cells; each one is an independent evaluation.

use crate::assumptions::Assumptions;
use crate::company::CompanyFinancials;
use crate::error::{Result, ValuationError};
use crate::projection::ValuationEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for deciding whether a grid axis value is the base value
pub const BASE_CELL_EPSILON: f64 = 1e-6;

/// Largest number of values allowed on either axis
pub const MAX_GRID_POINTS: usize = 21;

/// Shape of the grid: step sizes (percentage points) and points per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_wacc_step")]
    pub wacc_step: f64,
    #[serde(default = "default_growth_step")]
    pub growth_step: f64,
    /// Odd number of values per axis, 3..=MAX_GRID_POINTS
    #[serde(default = "default_points")]
    pub points: usize,
    /// Evaluate cells on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_wacc_step() -> f64 { 1.0 }
fn default_growth_step() -> f64 { 0.5 }
fn default_points() -> usize { 3 }

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            wacc_step: default_wacc_step(),
            growth_step: default_growth_step(),
            points: default_points(),
            parallel: false,
        }
    }
}

impl GridSpec {
    pub fn validate(&self) -> Result<()> {
        if self.points < 3 || self.points > MAX_GRID_POINTS || self.points % 2 == 0 {
            return Err(ValuationError::InvalidGridSize {
                points: self.points,
                max: MAX_GRID_POINTS,
            });
        }
        Ok(())
    }
}

/// Symmetric axis centred on `base`. The centre entry is `base` itself so the
/// centre cell evaluates exactly the unperturbed assumptions.
fn axis(base: f64, step: f64, points: usize) -> Vec<f64> {
    let half = (points / 2) as i64;
    (-half..=half)
        .map(|k| if k == 0 { base } else { base + k as f64 * step })
        .collect()
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCell {
    pub wacc_pct: f64,
    pub terminal_growth_pct: f64,
    pub share_price: f64,
    /// Cell sits at the base WACC and base terminal growth
    pub is_base: bool,
}

/// Implied share price across WACC (rows) and terminal growth (columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub base_wacc_pct: f64,
    pub base_terminal_growth_pct: f64,
    pub wacc_rates: Vec<f64>,
    pub terminal_growth_rates: Vec<f64>,
    /// Row-major: `cells[row][col]`
    pub cells: Vec<Vec<SensitivityCell>>,
}

impl SensitivityGrid {
    /// The base-case cell (centre of the grid)
    pub fn center(&self) -> &SensitivityCell {
        &self.cells[self.wacc_rates.len() / 2][self.terminal_growth_rates.len() / 2]
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&SensitivityCell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn rows(&self) -> usize {
        self.wacc_rates.len()
    }

    pub fn cols(&self) -> usize {
        self.terminal_growth_rates.len()
    }
}

/// Builds sensitivity grids with a fixed engine and grid shape
#[derive(Debug, Clone)]
pub struct SensitivityBuilder {
    engine: ValuationEngine,
    spec: GridSpec,
}

impl SensitivityBuilder {
    /// Create a builder, rejecting grid shapes without a single centre cell
    pub fn new(engine: ValuationEngine, spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { engine, spec })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Engine used for every cell
    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    /// Evaluate every cell around the base WACC and terminal growth
    pub fn build(&self, company: &CompanyFinancials, base: &Assumptions) -> SensitivityGrid {
        let wacc_rates = axis(base.wacc_pct, self.spec.wacc_step, self.spec.points);
        let terminal_growth_rates =
            axis(base.terminal_growth_pct, self.spec.growth_step, self.spec.points);

        let pairs: Vec<(f64, f64)> = wacc_rates
            .iter()
            .flat_map(|&w| terminal_growth_rates.iter().map(move |&g| (w, g)))
            .collect();

        let evaluate_cell = |&(w, g): &(f64, f64)| -> SensitivityCell {
            let result = self.engine.evaluate(company, &base.with_discounting(w, g));
            SensitivityCell {
                wacc_pct: w,
                terminal_growth_pct: g,
                share_price: result.implied_share_price,
                is_base: (w - base.wacc_pct).abs() < BASE_CELL_EPSILON
                    && (g - base.terminal_growth_pct).abs() < BASE_CELL_EPSILON,
            }
        };

        let flat: Vec<SensitivityCell> = if self.spec.parallel {
            pairs.par_iter().map(&evaluate_cell).collect()
        } else {
            pairs.iter().map(&evaluate_cell).collect()
        };

        let cells = flat
            .chunks(terminal_growth_rates.len())
            .map(|row| row.to_vec())
            .collect();

        SensitivityGrid {
            base_wacc_pct: base.wacc_pct,
            base_terminal_growth_pct: base.terminal_growth_pct,
            wacc_rates,
            terminal_growth_rates,
            cells,
        }
    }
}

impl Default for SensitivityBuilder {
    fn default() -> Self {
        Self {
            engine: ValuationEngine::default(),
            spec: GridSpec::default(),
        }
    }
}

/// 3x3 grid with the default engine
pub fn build(
    company: &CompanyFinancials,
    base: &Assumptions,
    wacc_step: f64,
    growth_step: f64,
) -> SensitivityGrid {
    let spec = GridSpec {
        wacc_step,
        growth_step,
        ..GridSpec::default()
    };
    SensitivityBuilder {
        engine: ValuationEngine::default(),
        spec,
    }
    .build(company, base)
}
