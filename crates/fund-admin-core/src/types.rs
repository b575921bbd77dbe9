use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%) unless a field says otherwise.
pub type Rate = Decimal;

/// Multiples (e.g., 2.5x TVPI)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    HKD,
    SGD,
    Other(String),
}

/// A single cash flow at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A series of cash flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub flows: Vec<CashFlow>,
    pub currency: Currency,
}

/// One investor's share of a fund, as a percentage summing to 100 across
/// all investors of the fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorStake {
    pub investor_id: Uuid,
    /// Ownership percentage (0-100)
    pub ownership_pct: Rate,
}

/// Round a monetary amount to the smallest currency unit (2 dp), half-up.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
