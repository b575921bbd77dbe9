use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_admin_core::waterfall::{self, WaterfallInput};

use crate::input;

/// Arguments for the distribution waterfall
#[derive(Args)]
pub struct WaterfallArgs {
    /// Path to JSON input file (required for per-investor allocation;
    /// overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total amount available for distribution
    #[arg(long)]
    pub total: Option<Decimal>,

    /// Called capital not yet returned to investors
    #[arg(long)]
    pub unreturned_capital: Option<Decimal>,

    /// Compounded preferred return accrued and not yet satisfied
    #[arg(long, default_value = "0")]
    pub preferred_owed: Decimal,

    /// GP carry as a decimal fraction (0.20 = 20%)
    #[arg(long, default_value = "0.20")]
    pub carry_rate: Decimal,

    /// GP share within the catch-up tier as a decimal fraction
    #[arg(long, default_value = "1.0")]
    pub catch_up_rate: Decimal,

    /// GP commitment as a decimal fraction of the fund
    #[arg(long, default_value = "0.02")]
    pub gp_commitment_pct: Decimal,

    /// Management fee settled at exit, deducted before tier 1
    #[arg(long)]
    pub management_fee_at_exit: Option<Decimal>,
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let waterfall_input: WaterfallInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let total = args.total.ok_or("--total is required (or provide --input)")?;
        let unreturned = args
            .unreturned_capital
            .ok_or("--unreturned-capital is required (or provide --input)")?;

        WaterfallInput {
            total_distributable: total,
            unreturned_capital: unreturned,
            preferred_owed: args.preferred_owed,
            carry_rate: args.carry_rate,
            catch_up_rate: args.catch_up_rate,
            gp_commitment_pct: args.gp_commitment_pct,
            management_fee_at_exit: args.management_fee_at_exit,
            investors: Vec::new(),
        }
    };

    let result = waterfall::calculate_waterfall(&waterfall_input)?;
    Ok(serde_json::to_value(&result)?)
}
