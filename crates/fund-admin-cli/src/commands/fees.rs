use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_admin_core::fees::{self, FeeBasis, FeeConfig, FeeInput, InvestorTerms};

use crate::input;

/// Arguments for the management fee calculation
#[derive(Args)]
pub struct FeesArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal the fee accrues on, already period-adjusted
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Management fee rate as a percentage (2 = 2%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// VAT rate as a percentage (16 = 16%)
    #[arg(long, default_value = "0")]
    pub vat_rate: Decimal,

    /// Whether VAT applies to this fee
    #[arg(long)]
    pub vat_applicable: bool,

    /// Investor fee discount as a percentage
    #[arg(long, default_value = "0")]
    pub discount_pct: Decimal,

    /// Investor is VAT exempt
    #[arg(long)]
    pub vat_exempt: bool,
}

pub fn run_fees(args: FeesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fee_input: FeeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;

        FeeInput {
            principal,
            config: FeeConfig {
                rate,
                basis: FeeBasis::Committed,
                vat_rate: args.vat_rate,
                vat_applicable: args.vat_applicable,
                period_label: None,
                dual_rate: None,
            },
            terms: InvestorTerms {
                fee_discount_pct: args.discount_pct,
                vat_exempt: args.vat_exempt,
            },
        }
    };

    let result = fees::compute_fees(&fee_input)?;
    Ok(serde_json::to_value(&result)?)
}
