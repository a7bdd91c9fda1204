//! Projection engine: annual forecast, terminal value and valuation bridge

mod engine;
mod cashflows;
pub mod discount;

pub use engine::{evaluate, EngineConfig, TaxTreatment, ValuationEngine};
pub use cashflows::{DcfResult, YearProjection};
pub use discount::{EffectiveRate, TERMINAL_SPREAD_FLOOR};
