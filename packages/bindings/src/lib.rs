use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use calc_kit_core::{CalcResult, ComputationOutput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Deserialize the input JSON, run the calculator and serialize its envelope.
fn run_json<I, O>(
    input_json: &str,
    calculate: fn(&I) -> CalcResult<ComputationOutput<O>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calculate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payment(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::loan::payment::calculate_payment)
}

#[napi]
pub fn simulate_amortization(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::loan::amortization::simulate)
}

#[napi]
pub fn analyze_extra_payments(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        calc_kit_core::loan::amortization::analyze_extra_payments,
    )
}

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::loan::mortgage::calculate_mortgage)
}

#[napi]
pub fn calculate_balloon(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::loan::balloon::calculate_balloon)
}

// ---------------------------------------------------------------------------
// Investing
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_kelly(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::investing::kelly::calculate_kelly)
}

#[napi]
pub fn calculate_correlation(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        calc_kit_core::investing::correlation::calculate_correlation,
    )
}

#[napi]
pub fn calculate_beta(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::investing::correlation::calculate_beta)
}

#[napi]
pub fn calculate_option_probability(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        calc_kit_core::investing::options_probability::calculate_option_probability,
    )
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_bmi(input_json: String) -> NapiResult<String> {
    run_json(&input_json, calc_kit_core::health::bmi::calculate_bmi)
}

// ---------------------------------------------------------------------------
// Interpretation
// ---------------------------------------------------------------------------

/// Interpret a decimal string against one of the built-in threshold tables.
#[napi]
pub fn interpret_value(table: String, value: String) -> NapiResult<String> {
    let threshold_table = calc_kit_core::interpret::BUILT_IN_TABLES
        .iter()
        .find(|t| t.name == table)
        .ok_or_else(|| to_napi_error(format!("unknown interpretation table '{table}'")))?;
    let value: Decimal = value.trim().parse().map_err(to_napi_error)?;
    let interpretation = threshold_table.interpret(value).map_err(to_napi_error)?;
    serde_json::to_string(&interpretation).map_err(to_napi_error)
}
