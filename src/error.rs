//! Error types for catalog lookup, input parsing and grid construction

/// Top-level error type for valuforesight.
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("unknown company id: {id}")]
    UnknownCompany { id: String },

    #[error("duplicate company id in catalog: {id}")]
    DuplicateCompany { id: String },

    #[error("company catalog is empty")]
    EmptyCatalog,

    #[error("not a number: {input:?}")]
    InvalidNumber { input: String },

    #[error("unknown assumption: {key:?}")]
    UnknownAssumption { key: String },

    #[error("forecast horizon must be at most {max} years, got {years}")]
    InvalidHorizon { years: u32, max: u32 },

    #[error("sensitivity grid needs an odd number of points between 3 and {max}, got {points}")]
    InvalidGridSize { points: usize, max: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ValuationError>;
