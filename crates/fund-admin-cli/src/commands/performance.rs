use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_admin_core::metrics::{self, PerformanceInput};
use fund_admin_core::types::CashFlow;

use crate::input;

/// Arguments for fund performance metrics
#[derive(Args)]
pub struct PerformanceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Dated cash flows as DATE:AMOUNT pairs
    /// (e.g. "2020-01-01:-100,2021-01-01:110"); calls negative,
    /// distributions positive
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<String>>,

    /// As-of date for the NAV estimate (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Residual NAV estimate as of the as-of date
    #[arg(long, default_value = "0")]
    pub nav: Decimal,

    /// Total fees charged to date, for the net-IRR approximation
    #[arg(long, default_value = "0")]
    pub total_fees: Decimal,
}

pub fn run_performance(args: PerformanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let perf_input: PerformanceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let flows = args
            .flows
            .ok_or("--flows is required (or provide --input)")?;
        let as_of = args.as_of.ok_or("--as-of is required (or provide --input)")?;

        let cash_flows = flows
            .iter()
            .map(|spec| parse_flow(spec))
            .collect::<Result<Vec<CashFlow>, _>>()?;

        PerformanceInput {
            cash_flows,
            as_of,
            nav: args.nav,
            total_fees: args.total_fees,
        }
    };

    let result = metrics::compute_performance(&perf_input)?;
    Ok(serde_json::to_value(&result)?)
}

/// Parse a DATE:AMOUNT pair, e.g. "2020-01-01:-100".
fn parse_flow(spec: &str) -> Result<CashFlow, Box<dyn std::error::Error>> {
    let (date_part, amount_part) = spec
        .split_once(':')
        .ok_or_else(|| format!("Expected DATE:AMOUNT, got '{spec}'"))?;
    let date: NaiveDate = date_part
        .parse()
        .map_err(|e| format!("Bad date in '{spec}': {e}"))?;
    let amount: Decimal = amount_part
        .parse()
        .map_err(|e| format!("Bad amount in '{spec}': {e}"))?;
    Ok(CashFlow {
        date,
        amount,
        label: None,
    })
}
