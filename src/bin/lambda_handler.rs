//! AWS Lambda handler for DCF valuations
//!
//! Accepts a company id, optional assumption overrides and grid options as
//! JSON; returns the forecast, valuation bridge and sensitivity grid.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use valuforesight::assumptions::parse_percentage;
use valuforesight::company::{load_catalog, Catalog, CompanyId};
use valuforesight::report::{format_dollars, format_millions};
use valuforesight::{
    reduce, Action, AppState, AssumptionField, EngineConfig, GridSpec, SensitivityBuilder,
    TaxTreatment, Valuation, ValuationEngine, ValuationError,
};

/// Assumption input as typed by a user, or already numeric
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    fn as_text(&self) -> String {
        match self {
            InputValue::Number(n) => n.to_string(),
            InputValue::Text(s) => s.clone(),
        }
    }
}

/// Input configuration for a valuation
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    /// Company identifier (ticker)
    pub company: String,

    /// Overrides keyed by assumption name (e.g. "wacc": "9.5")
    #[serde(default)]
    pub assumptions: BTreeMap<String, InputValue>,

    /// Forecast horizon (default: 5, at most 100)
    #[serde(default)]
    pub forecast_years: Option<u32>,

    /// Sensitivity grid shape (default: 3x3, 1.0 / 0.5 point steps, at most 21x21)
    #[serde(default)]
    pub grid: GridSpec,

    #[serde(default)]
    pub tax_treatment: TaxTreatment,
}

/// Headline figures pre-formatted for display
#[derive(Debug, Serialize)]
pub struct Headline {
    pub enterprise_value: String,
    pub equity_value: String,
    pub implied_share_price: String,
}

/// Output from the valuation
#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub valuation: Valuation,
    pub headline: Headline,
    /// Overrides that were not numbers and were ignored
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_inputs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_body(message: String) -> String {
    serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}

/// Run one request body against the catalog, returning (status, JSON body)
fn respond(catalog: &Catalog, body: &str) -> (i64, String) {
    let request: ValuationRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return (400, error_body(format!("Invalid JSON: {}", e))),
    };

    match value(catalog, request) {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(json) => (200, json),
            Err(e) => (500, error_body(e.to_string())),
        },
        Err(e) => {
            let status = match e {
                ValuationError::UnknownCompany { .. } => 404,
                ValuationError::InvalidGridSize { .. } | ValuationError::InvalidHorizon { .. } => 422,
                _ => 400,
            };
            (status, error_body(e.to_string()))
        }
    }
}

fn value(catalog: &Catalog, request: ValuationRequest) -> Result<ValuationResponse, ValuationError> {
    let mut state = AppState::for_company(catalog, &CompanyId::new(&request.company))?;
    let mut rejected_inputs = Vec::new();

    for (key, input) in &request.assumptions {
        let field: AssumptionField = key.parse()?;
        let text = input.as_text();
        if parse_percentage(&text).is_err() {
            rejected_inputs.push(field.key().to_string());
        }
        state = reduce(catalog, &state, Action::SetAssumption { field, input: text })?;
    }

    if let Some(years) = request.forecast_years {
        state = reduce(catalog, &state, Action::SetForecastYears(years))?;
    }

    let engine = ValuationEngine::new(EngineConfig {
        tax_treatment: request.tax_treatment,
    });
    let grid = SensitivityBuilder::new(engine, request.grid)?;
    let valuation = state.valuation(catalog, &grid)?;

    let headline = Headline {
        enterprise_value: format_millions(valuation.result.enterprise_value),
        equity_value: format_millions(valuation.result.equity_value),
        implied_share_price: format_dollars(valuation.result.implied_share_price),
    };

    Ok(ValuationResponse {
        generated_at: Utc::now(),
        valuation,
        headline,
        rejected_inputs,
    })
}

fn http_response(status_code: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code,
        headers: Default::default(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

/// Lambda handler function
async fn handler(
    catalog: &Catalog,
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(http_response(200, None));
    }

    if request.is_base64_encoded {
        return Ok(http_response(415, Some(error_body("Expected a JSON text body".to_string()))));
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let (status, json) = respond(catalog, &body);
    if status == 200 {
        info!("valuation served");
    } else {
        warn!("request failed with status {}", status);
    }

    Ok(http_response(status, Some(json)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let catalog = match env::var("VALUFORESIGHT_CATALOG") {
        Ok(path) => load_catalog(path)?,
        Err(_) => Catalog::builtin(),
    };
    let catalog = &catalog;

    run(service_fn(move |event: LambdaEvent<LambdaFunctionUrlRequest>| async move {
        handler(catalog, event).await
    }))
    .await
}
