use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_fees(input_json: String) -> NapiResult<String> {
    let input: fund_admin_core::fees::FeeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fund_admin_core::fees::compute_fees(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn allocate_call(input_json: String) -> NapiResult<String> {
    let input: fund_admin_core::fees::CallAllocationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fund_admin_core::fees::allocate_call(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_waterfall(input_json: String) -> NapiResult<String> {
    let input: fund_admin_core::waterfall::WaterfallInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fund_admin_core::waterfall::calculate_waterfall(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_performance(input_json: String) -> NapiResult<String> {
    let input: fund_admin_core::metrics::PerformanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fund_admin_core::metrics::compute_performance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
