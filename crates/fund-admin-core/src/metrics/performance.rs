use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAdminError;
use crate::types::*;
use crate::FundAdminResult;

const IRR_INITIAL_GUESS: Decimal = dec!(0.10);
const IRR_MAX_ITERATIONS: u32 = 100;
const IRR_NPV_TOLERANCE: Decimal = dec!(0.0001);
const IRR_DERIVATIVE_FLOOR: Decimal = dec!(0.0000000001);
const IRR_RATE_FLOOR: Decimal = dec!(-0.99);
const IRR_RATE_CEILING: Decimal = dec!(10);
const DAYS_PER_YEAR: Decimal = dec!(365.25);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Input for fund performance metrics.
///
/// Capital calls are negative cash flows dated at the call date;
/// distributions are positive flows dated at the distribution date. The NAV
/// estimate is appended internally as a terminal positive flow at `as_of`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceInput {
    pub cash_flows: Vec<CashFlow>,
    pub as_of: NaiveDate,
    /// Residual NAV estimate as of `as_of`
    pub nav: Money,
    /// Total fees charged to date, for the net-IRR approximation
    #[serde(default)]
    pub total_fees: Money,
}

/// Fund performance metrics. IRR figures are percentages (10 = 10%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceOutput {
    pub irr: Rate,
    /// Gross IRR scaled by the fee ratio. An approximation of net IRR, not
    /// a net-cash-flow IRR.
    pub net_irr: Rate,
    pub tvpi: Multiple,
    pub dpi: Multiple,
    pub rvpi: Multiple,
    pub moic: Multiple,
    pub total_called: Money,
    pub total_distributed: Money,
    pub nav: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute IRR, net IRR, TVPI, DPI, RVPI and MOIC over a fund's cash-flow
/// history.
///
/// The IRR solver degrades rather than fails: a vanishing derivative or an
/// exhausted iteration ceiling returns the last estimate with a warning in
/// the envelope, so callers can flag the figure as low-confidence.
pub fn compute_performance(
    input: &PerformanceInput,
) -> FundAdminResult<ComputationOutput<PerformanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.nav < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "nav".into(),
            reason: "NAV cannot be negative".into(),
        });
    }
    if input.total_fees < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "total_fees".into(),
            reason: "Total fees cannot be negative".into(),
        });
    }
    for flow in &input.cash_flows {
        if flow.date > input.as_of {
            return Err(FundAdminError::InvalidInput {
                field: "cash_flows".into(),
                reason: format!("Cash flow dated {} is after the as-of date", flow.date),
            });
        }
    }

    let total_called: Money = input
        .cash_flows
        .iter()
        .filter(|cf| cf.amount.is_sign_negative())
        .map(|cf| cf.amount.abs())
        .sum();
    let total_distributed: Money = input
        .cash_flows
        .iter()
        .filter(|cf| cf.amount.is_sign_positive())
        .map(|cf| cf.amount)
        .sum();

    let mut flows: Vec<(NaiveDate, Money)> = input
        .cash_flows
        .iter()
        .map(|cf| (cf.date, cf.amount))
        .collect();
    flows.sort_by_key(|(date, _)| *date);
    if input.nav > Decimal::ZERO {
        flows.push((input.as_of, input.nav));
    }

    let irr = solve_irr(&flows, &mut warnings);

    let net_irr = if total_called.is_zero() {
        Decimal::ZERO
    } else {
        irr * (Decimal::ONE - input.total_fees / total_called)
    };

    let (tvpi, dpi, rvpi) = if total_called.is_zero() {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            (input.nav + total_distributed) / total_called,
            total_distributed / total_called,
            input.nav / total_called,
        )
    };

    let output = PerformanceOutput {
        irr,
        net_irr,
        tvpi,
        dpi,
        rvpi,
        moic: tvpi,
        total_called,
        total_distributed,
        nav: input.nav,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fund Performance: Newton-Raphson IRR, fee-ratio net IRR, TVPI/DPI/RVPI/MOIC",
        &serde_json::json!({
            "as_of": input.as_of.to_string(),
            "nav": input.nav.to_string(),
            "total_fees": input.total_fees.to_string(),
            "num_cash_flows": input.cash_flows.len(),
            "day_count": "actual/365.25",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Newton-Raphson IRR over dated cash flows, returned as a percentage.
///
/// NPV(rate) = sum(amount_i / (1+rate)^(days_i/365.25)). Converges when
/// |NPV| < 1e-4. A derivative below 1e-10 in magnitude, or an exhausted
/// iteration ceiling, is an approximate-convergence exit: the last rate is
/// returned and a warning recorded. Fewer than two flows define IRR as 0.
fn solve_irr(flows: &[(NaiveDate, Money)], warnings: &mut Vec<String>) -> Rate {
    if flows.len() < 2 {
        return Decimal::ZERO;
    }

    let base_date = flows[0].0;
    let mut rate = IRR_INITIAL_GUESS;

    for _ in 0..IRR_MAX_ITERATIONS {
        let mut npv = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (date, amount) in flows {
            let years = Decimal::from((*date - base_date).num_days()) / DAYS_PER_YEAR;
            let discount = one_plus_r.powd(years);
            if discount.is_zero() {
                continue;
            }
            npv += amount / discount;
            dnpv -= years * amount / (one_plus_r * discount);
        }

        if npv.abs() < IRR_NPV_TOLERANCE {
            return rate * dec!(100);
        }

        if dnpv.abs() < IRR_DERIVATIVE_FLOOR {
            warnings.push(
                "IRR derivative vanished before convergence; returning last estimate".into(),
            );
            return rate * dec!(100);
        }

        rate -= npv / dnpv;

        // Guard against divergence
        if rate < IRR_RATE_FLOOR {
            rate = IRR_RATE_FLOOR;
        } else if rate > IRR_RATE_CEILING {
            rate = IRR_RATE_CEILING;
        }
    }

    warnings.push(format!(
        "IRR did not converge within {IRR_MAX_ITERATIONS} iterations; returning last estimate"
    ));
    rate * dec!(100)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
