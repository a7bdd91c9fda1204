//! ValuForesight CLI
//!
//! Command-line interface for DCF valuations and sensitivity grids.
//! The company catalog comes from --catalog, then $VALUFORESIGHT_CATALOG,
//! then the built-in set.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use valuforesight::assumptions::DEFAULT_FORECAST_YEARS;
use valuforesight::company::{load_catalog, Catalog, CompanyId};
use valuforesight::report::{format_dollars, format_millions, format_rate, CompanyPanel, ForecastTable, GridTable, ValuationSummary};
use valuforesight::{
    reduce, Action, AppState, AssumptionField, Assumptions, EngineConfig, GridSpec, SensitivityBuilder,
    TaxTreatment, Valuation, ValuationEngine,
};

#[derive(Parser, Debug)]
#[command(name = "valuforesight", version, about = "Discounted cash flow valuation engine")]
struct Cli {
    /// Company catalog CSV
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the companies in the catalog with their base-case price
    Companies,
    /// Forecast and valuation summary for one company
    Value {
        #[command(flatten)]
        valuation: ValuationArgs,
        /// Write the forecast rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// WACC x terminal growth grid of implied share prices
    Sensitivity {
        #[command(flatten)]
        valuation: ValuationArgs,
        /// WACC step in percentage points
        #[arg(long, default_value_t = 1.0)]
        wacc_step: f64,
        /// Terminal growth step in percentage points
        #[arg(long, default_value_t = 0.5)]
        growth_step: f64,
        /// Values per axis (odd, 3 to 21)
        #[arg(long, default_value_t = 3)]
        points: usize,
        /// Evaluate grid cells in parallel
        #[arg(long)]
        parallel: bool,
    },
}

/// Company selection and assumption overrides, all percentages as text
#[derive(Args, Debug)]
struct ValuationArgs {
    /// Company identifier (ticker); defaults to the first catalog entry
    #[arg(short, long)]
    company: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    revenue_growth: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    ebit_margin: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    tax_rate: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    da_pct: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    capex_pct: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    change_nwc_pct: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    wacc: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    terminal_growth: Option<String>,
    /// Forecast horizon in years (at most 100)
    #[arg(long, default_value_t = DEFAULT_FORECAST_YEARS)]
    years: u32,
    /// Floor tax expense at zero (no credit on negative EBIT)
    #[arg(long)]
    tax_floor: bool,
    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl ValuationArgs {
    fn overrides(&self) -> [(AssumptionField, Option<&String>); 8] {
        [
            (AssumptionField::RevenueGrowth, self.revenue_growth.as_ref()),
            (AssumptionField::EbitMargin, self.ebit_margin.as_ref()),
            (AssumptionField::TaxRate, self.tax_rate.as_ref()),
            (AssumptionField::DaPct, self.da_pct.as_ref()),
            (AssumptionField::CapexPct, self.capex_pct.as_ref()),
            (AssumptionField::ChangeNwcPct, self.change_nwc_pct.as_ref()),
            (AssumptionField::Wacc, self.wacc.as_ref()),
            (AssumptionField::TerminalGrowth, self.terminal_growth.as_ref()),
        ]
    }

    /// Company defaults, then each override applied through the reducer.
    /// Rejected text is logged by the reducer and the prior value kept.
    fn state(&self, catalog: &Catalog) -> Result<AppState> {
        let mut state = match &self.company {
            Some(id) => AppState::for_company(catalog, &CompanyId::new(id))?,
            None => AppState::initial(catalog),
        };

        for (field, input) in self.overrides() {
            let Some(input) = input else { continue };
            state = reduce(catalog, &state, Action::SetAssumption {
                field,
                input: input.clone(),
            })?;
        }

        reduce(catalog, &state, Action::SetForecastYears(self.years)).map_err(Into::into)
    }

    fn engine(&self) -> ValuationEngine {
        let tax_treatment = if self.tax_floor {
            TaxTreatment::FloorAtZero
        } else {
            TaxTreatment::Linear
        };
        ValuationEngine::new(EngineConfig { tax_treatment })
    }
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    valuation: &'a Valuation,
}

fn load(cli_path: Option<PathBuf>) -> Result<Catalog> {
    let path = cli_path.or_else(|| env::var("VALUFORESIGHT_CATALOG").ok().map(PathBuf::from));
    match path {
        Some(path) => load_catalog(&path)
            .with_context(|| format!("loading company catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

fn print_json(valuation: &Valuation) -> Result<()> {
    let report = Report {
        generated_at: Utc::now(),
        valuation,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_assumptions(state: &AppState) {
    println!("Assumptions:");
    for field in AssumptionField::ALL {
        println!("  {:<24}{:>8}", field.label(), format_rate(state.assumptions.get(field)));
    }
    println!("  {:<24}{:>8}", "Forecast years", state.assumptions.forecast_years);
    println!();
}

fn list_companies(catalog: &Catalog) {
    let engine = ValuationEngine::default();

    println!("{:<8} {:<24} {:>6} {:>16} {:>14}", "ID", "Name", "Year", "Revenue", "Base price");
    println!("{}", "-".repeat(72));
    for company in catalog.iter() {
        let result = engine.evaluate(company, &Assumptions::for_company(company));
        println!(
            "{:<8} {:<24} {:>6} {:>16} {:>14}",
            company.id,
            company.name,
            company.base_year,
            format_millions(company.revenue),
            format_dollars(result.implied_share_price),
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let catalog = load(cli.catalog)?;

    match cli.command {
        Command::Companies => list_companies(&catalog),

        Command::Value { valuation: args, csv: csv_path } => {
            let state = args.state(&catalog)?;
            let grid = SensitivityBuilder::new(args.engine(), GridSpec::default())?;
            let valuation = state.valuation(&catalog, &grid)?;

            if let Some(path) = csv_path {
                let mut writer = csv::Writer::from_path(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                for row in &valuation.result.projections {
                    writer.serialize(row)?;
                }
                writer.flush()?;
                eprintln!("Forecast written to: {}", path.display());
            }

            if args.json {
                return print_json(&valuation);
            }

            print!("{}", CompanyPanel(&valuation.company));
            println!();
            print_assumptions(&state);
            println!("{}-year forecast & FCF (millions):", state.assumptions.forecast_years);
            print!("{}", ForecastTable(&valuation.result));
            println!();
            println!("Valuation summary:");
            print!("{}", ValuationSummary(&valuation.result));
        }

        Command::Sensitivity { valuation: args, wacc_step, growth_step, points, parallel } => {
            let state = args.state(&catalog)?;
            let spec = GridSpec { wacc_step, growth_step, points, parallel };
            let grid = SensitivityBuilder::new(args.engine(), spec)?;
            let valuation = state.valuation(&catalog, &grid)?;

            if args.json {
                return print_json(&valuation);
            }

            print!("{}", CompanyPanel(&valuation.company));
            println!();
            println!("Sensitivity: WACC vs terminal growth (implied price)");
            println!("Bracketed cell = base case ({} WACC, {} terminal growth)",
                format_rate(state.assumptions.wacc_pct),
                format_rate(state.assumptions.terminal_growth_pct));
            print!("{}", GridTable(&valuation.sensitivity));
        }
    }

    Ok(())
}
