//! Load a company catalog from CSV (one row per company)

use super::catalog::Catalog;
use super::data::{CompanyFinancials, CompanyId, DefaultAssumptions};
use crate::error::Result;
use csv::Reader;
use log::info;
use std::path::Path;

/// Default location of the catalog file
pub const DEFAULT_CATALOG_PATH: &str = "data/companies.csv";

/// Raw CSV row matching companies.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    ticker: String,
    base_year: i32,
    revenue: f64,
    ebit: f64,
    da: f64,
    capex: f64,
    change_nwc: f64,
    cash: f64,
    debt: f64,
    shares_outstanding: f64,
    default_growth: f64,
    default_ebit_margin: f64,
    default_tax_rate: f64,
    default_da_pct: f64,
    default_capex_pct: f64,
    default_change_nwc_pct: f64,
    default_wacc: f64,
    default_terminal_growth: f64,
}

impl CsvRow {
    fn into_company(self) -> CompanyFinancials {
        CompanyFinancials {
            id: CompanyId::new(&self.id),
            name: self.name,
            ticker: self.ticker,
            base_year: self.base_year,
            revenue: self.revenue,
            ebit: self.ebit,
            da: self.da,
            capex: self.capex,
            change_nwc: self.change_nwc,
            cash: self.cash,
            debt: self.debt,
            shares_outstanding: self.shares_outstanding,
            defaults: DefaultAssumptions {
                growth: self.default_growth,
                ebit_margin: self.default_ebit_margin,
                tax_rate: self.default_tax_rate,
                da_pct: self.default_da_pct,
                capex_pct: self.default_capex_pct,
                change_nwc_pct: self.default_change_nwc_pct,
                wacc: self.default_wacc,
                terminal_growth: self.default_terminal_growth,
            },
        }
    }
}

/// Load a catalog from a CSV file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)?;
    let catalog = read_rows(reader)?;
    info!("loaded {} companies from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load a catalog from any reader (e.g., string buffer, request body)
pub fn load_catalog_from_reader<R: std::io::Read>(reader: R) -> Result<Catalog> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Catalog> {
    let mut companies = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        companies.push(row.into_company());
    }

    Catalog::from_companies(companies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuationError;

    const HEADER: &str = "id,name,ticker,base_year,revenue,ebit,da,capex,change_nwc,cash,debt,shares_outstanding,default_growth,default_ebit_margin,default_tax_rate,default_da_pct,default_capex_pct,default_change_nwc_pct,default_wacc,default_terminal_growth";

    #[test]
    fn test_load_default_catalog_matches_builtin() {
        let loaded = load_catalog(DEFAULT_CATALOG_PATH).expect("Failed to load catalog");
        let builtin = Catalog::builtin();

        assert_eq!(loaded.len(), builtin.len());
        for (a, b) in loaded.iter().zip(builtin.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_load_from_reader() {
        let data = format!(
            "{HEADER}\nacme,Acme Corp,ACME,2023,100,20,5,4,1,10,30,10,10,20,25,5,4,1,10,2\n"
        );
        let catalog = load_catalog_from_reader(data.as_bytes()).unwrap();

        let acme = catalog.get(&CompanyId::new("ACME")).unwrap();
        assert_eq!(acme.name, "Acme Corp");
        assert_eq!(acme.base_year, 2023);
        assert_eq!(acme.defaults.terminal_growth, 2.0);
        assert_eq!(acme.net_debt(), 20.0);
    }

    #[test]
    fn test_bad_number_is_csv_error() {
        let data = format!(
            "{HEADER}\nacme,Acme Corp,ACME,2023,lots,20,5,4,1,10,30,10,10,20,25,5,4,1,10,2\n"
        );
        let err = load_catalog_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ValuationError::Csv(_)));
    }

    #[test]
    fn test_header_only_is_empty_catalog() {
        let err = load_catalog_from_reader(format!("{HEADER}\n").as_bytes()).unwrap_err();
        assert!(matches!(err, ValuationError::EmptyCatalog));
    }
}
