//! ValuForesight - discounted cash flow valuation engine
//!
//! This library provides:
//! - Annual free cash flow forecasts from percentage assumptions
//! - Gordon growth terminal value, enterprise and equity value, implied price
//! - WACC x terminal growth sensitivity grids
//! - A fixed company catalog (built in or loaded from CSV)
//! - Reducer-style application state and text rendering

pub mod error;
pub mod company;
pub mod assumptions;
pub mod projection;
pub mod sensitivity;
pub mod state;
pub mod report;

// Re-export commonly used types
pub use error::{Result, ValuationError};
pub use company::{Catalog, CompanyFinancials, CompanyId};
pub use assumptions::{AssumptionField, Assumptions};
pub use projection::{evaluate, DcfResult, EngineConfig, TaxTreatment, ValuationEngine, YearProjection};
pub use sensitivity::{GridSpec, SensitivityBuilder, SensitivityCell, SensitivityGrid};
pub use state::{reduce, Action, AppState, Valuation};
