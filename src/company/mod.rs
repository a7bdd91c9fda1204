//! Company records and the catalog they are selected from

mod data;
mod catalog;
pub mod loader;

pub use data::{CompanyFinancials, CompanyId, DefaultAssumptions};
pub use catalog::Catalog;
pub use loader::{load_catalog, load_catalog_from_reader, DEFAULT_CATALOG_PATH};
