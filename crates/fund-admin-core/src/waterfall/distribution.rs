use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAdminError;
use crate::types::*;
use crate::FundAdminResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for a distribution waterfall.
///
/// `carry_rate`, `catch_up_rate` and `gp_commitment_pct` are decimal
/// fractions; investor `ownership_pct` values are percentages summing
/// to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallInput {
    /// Total amount available for distribution
    pub total_distributable: Money,
    /// Called capital not yet returned to investors
    pub unreturned_capital: Money,
    /// Compounded preferred return accrued and not yet satisfied
    pub preferred_owed: Money,
    /// GP carried-interest share of profit (typically 0.20)
    pub carry_rate: Rate,
    /// GP share within the catch-up tier (typically 1.0)
    pub catch_up_rate: Rate,
    /// GP commitment as a fraction of the fund (typically 0.01 - 0.05)
    pub gp_commitment_pct: Rate,
    /// Management fee settled at exit, deducted before tier 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_fee_at_exit: Option<Money>,
    /// Investor stakes for the per-investor allocation of the LP total
    pub investors: Vec<InvestorStake>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// The four tiers of the distribution waterfall, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallTier {
    ReturnOfCapital,
    PreferredReturn,
    GpCatchUp,
    ResidualSplit,
}

/// Result for a single waterfall tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierResult {
    pub tier: WaterfallTier,
    /// Total amount consumed by this tier
    pub amount: Money,
    pub to_gp: Money,
    pub to_lp: Money,
    /// Balance left after this tier
    pub remaining_after: Money,
}

/// One investor's share of the LP total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorDistribution {
    pub investor_id: uuid::Uuid,
    pub ownership_pct: Rate,
    pub amount: Money,
}

/// Full waterfall result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallOutput {
    /// Management fee deducted at exit (zero when not configured)
    pub management_fee_at_exit: Money,
    /// Per-tier breakdown in execution order
    pub tiers: Vec<TierResult>,
    pub total_to_lp: Money,
    pub total_to_gp: Money,
    /// Per-investor allocation of the LP total, pro-rata by ownership
    pub allocations: Vec<InvestorDistribution>,
}

impl WaterfallOutput {
    /// Amount consumed by a given tier (zero if somehow absent).
    pub fn tier_amount(&self, tier: WaterfallTier) -> Money {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map(|t| t.amount)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Tier fold
// ---------------------------------------------------------------------------

/// Accumulator threaded through the pure per-tier functions. Tracks the
/// undistributed balance and the LP profit distributed so far (the catch-up
/// target base).
#[derive(Debug, Clone)]
struct TierState {
    remaining: Money,
    lp_profit: Money,
    tiers: Vec<TierResult>,
}

impl TierState {
    fn new(distributable: Money) -> Self {
        TierState {
            remaining: distributable,
            lp_profit: Decimal::ZERO,
            tiers: Vec::with_capacity(4),
        }
    }

    fn push(mut self, tier: WaterfallTier, amount: Money, to_gp: Money) -> Self {
        let to_lp = amount - to_gp;
        self.remaining -= amount;
        self.tiers.push(TierResult {
            tier,
            amount,
            to_gp,
            to_lp,
            remaining_after: self.remaining,
        });
        self
    }
}

/// Tier 1: return of called, undistributed capital, split pro-rata GP/LP by
/// the GP commitment.
fn tier_return_of_capital(state: TierState, input: &WaterfallInput) -> TierState {
    let amount = state.remaining.min(input.unreturned_capital);
    let to_gp = amount * input.gp_commitment_pct;
    state.push(WaterfallTier::ReturnOfCapital, amount, to_gp)
}

/// Tier 2: compounded preferred return not yet satisfied.
fn tier_preferred_return(state: TierState, input: &WaterfallInput) -> TierState {
    let amount = state.remaining.min(input.preferred_owed);
    let to_gp = amount * input.gp_commitment_pct;
    let mut state = state.push(WaterfallTier::PreferredReturn, amount, to_gp);
    let lp_share = state.tiers.last().map(|t| t.to_lp).unwrap_or(Decimal::ZERO);
    state.lp_profit += lp_share;
    state
}

/// Tier 3: GP catch-up until the GP's cumulative carry reaches its target
/// share of profit distributed so far. Target: carry / (1 - carry) of the
/// LP profit paid in tier 2.
fn tier_gp_catch_up(state: TierState, input: &WaterfallInput) -> TierState {
    let target = if input.carry_rate < Decimal::ONE {
        (input.carry_rate / (Decimal::ONE - input.carry_rate)) * state.lp_profit
    } else {
        // 100% carry: catch-up takes the whole balance
        state.remaining
    };
    let amount = state.remaining.min(target).max(Decimal::ZERO);
    let to_gp = amount * input.catch_up_rate;
    let mut state = state.push(WaterfallTier::GpCatchUp, amount, to_gp);
    let lp_share = state.tiers.last().map(|t| t.to_lp).unwrap_or(Decimal::ZERO);
    state.lp_profit += lp_share;
    state
}

/// Tier 4: residual split of whatever is left, carry share to the GP.
fn tier_residual_split(state: TierState, input: &WaterfallInput) -> TierState {
    let amount = state.remaining;
    let to_gp = amount * input.carry_rate;
    state.push(WaterfallTier::ResidualSplit, amount, to_gp)
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Calculate a four-tier distribution waterfall.
///
/// Tiers execute strictly in order against the remaining balance; each tier
/// caps at what is left, so no tier ever produces a negative remainder. The
/// LP total is then allocated per investor pro-rata by ownership, with the
/// final investor absorbing rounding drift.
pub fn calculate_waterfall(
    input: &WaterfallInput,
) -> FundAdminResult<ComputationOutput<WaterfallOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    // Management fee at exit comes off the top, capped at the balance
    let exit_fee = input
        .management_fee_at_exit
        .unwrap_or(Decimal::ZERO)
        .min(input.total_distributable);

    let state = TierState::new(input.total_distributable - exit_fee);
    let state = tier_return_of_capital(state, input);
    let state = tier_preferred_return(state, input);
    let state = tier_gp_catch_up(state, input);
    let state = tier_residual_split(state, input);

    let total_to_gp: Money = state.tiers.iter().map(|t| t.to_gp).sum();
    let total_to_lp: Money = state.tiers.iter().map(|t| t.to_lp).sum();

    let allocations = allocate_lp_total(total_to_lp, &input.investors, &mut warnings);

    let output = WaterfallOutput {
        management_fee_at_exit: exit_fee,
        tiers: state.tiers,
        total_to_lp,
        total_to_gp,
        allocations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Distribution Waterfall (ROC / preferred / catch-up / residual)",
        &serde_json::json!({
            "total_distributable": input.total_distributable.to_string(),
            "unreturned_capital": input.unreturned_capital.to_string(),
            "preferred_owed": input.preferred_owed.to_string(),
            "carry_rate": input.carry_rate.to_string(),
            "catch_up_rate": input.catch_up_rate.to_string(),
            "gp_commitment_pct": input.gp_commitment_pct.to_string(),
            "num_investors": input.investors.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate(input: &WaterfallInput) -> FundAdminResult<()> {
    if input.total_distributable < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "total_distributable".into(),
            reason: "Distributable amount cannot be negative".into(),
        });
    }
    if input.unreturned_capital < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "unreturned_capital".into(),
            reason: "Unreturned capital cannot be negative".into(),
        });
    }
    if input.preferred_owed < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "preferred_owed".into(),
            reason: "Preferred owed cannot be negative".into(),
        });
    }
    for (field, value) in [
        ("carry_rate", input.carry_rate),
        ("catch_up_rate", input.catch_up_rate),
        ("gp_commitment_pct", input.gp_commitment_pct),
    ] {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(FundAdminError::InvalidInput {
                field: field.into(),
                reason: "Rate must be between 0 and 1".into(),
            });
        }
    }
    if let Some(fee) = input.management_fee_at_exit {
        if fee < Decimal::ZERO {
            return Err(FundAdminError::InvalidInput {
                field: "management_fee_at_exit".into(),
                reason: "Exit fee cannot be negative".into(),
            });
        }
    }
    if !input.investors.is_empty() {
        let pct_sum: Decimal = input.investors.iter().map(|s| s.ownership_pct).sum();
        if (pct_sum - dec!(100)).abs() > dec!(0.01) {
            return Err(FundAdminError::InvalidInput {
                field: "investors".into(),
                reason: format!("Ownership percentages must sum to 100, got {pct_sum}"),
            });
        }
    }
    Ok(())
}

/// Allocate the LP total per investor, pro-rata by ownership. Amounts are
/// rounded to the smallest currency unit; the last investor absorbs the
/// drift so the allocation reconciles exactly.
fn allocate_lp_total(
    total_to_lp: Money,
    investors: &[InvestorStake],
    warnings: &mut Vec<String>,
) -> Vec<InvestorDistribution> {
    if investors.is_empty() {
        if total_to_lp > Decimal::ZERO {
            warnings.push("LP total distributed with no investor stakes supplied".into());
        }
        return Vec::new();
    }

    let mut allocations = Vec::with_capacity(investors.len());
    let mut allocated = Decimal::ZERO;
    let last = investors.len() - 1;
    for (i, stake) in investors.iter().enumerate() {
        let amount = if i == last {
            round_currency(total_to_lp) - allocated
        } else {
            round_currency(total_to_lp * stake.ownership_pct / dec!(100))
        };
        allocated += amount;
        allocations.push(InvestorDistribution {
            investor_id: stake.investor_id,
            ownership_pct: stake.ownership_pct,
            amount,
        });
    }
    allocations
}

// ---------------------------------------------------------------------------
// Preferred-return accrual
// ---------------------------------------------------------------------------

/// Compounded preferred return accrued on `capital` at `hurdle_rate` over
/// `years`, less what has already been paid. Floored at zero.
pub fn accrued_preferred(
    capital: Money,
    hurdle_rate: Rate,
    years: Years,
    already_paid: Money,
) -> FundAdminResult<Money> {
    if capital < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "capital".into(),
            reason: "Capital cannot be negative".into(),
        });
    }
    if hurdle_rate < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "hurdle_rate".into(),
            reason: "Hurdle rate cannot be negative".into(),
        });
    }
    if years < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "years".into(),
            reason: "Years cannot be negative".into(),
        });
    }

    let growth = (Decimal::ONE + hurdle_rate).powd(years);
    let accrued = capital * (growth - Decimal::ONE) - already_paid;
    Ok(accrued.max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
