use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FundAdminError;
use crate::types::{InvestorStake, Money};
use crate::FundAdminResult;

/// An investor's committed capital in a fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorCommitment {
    pub investor_id: Uuid,
    pub commitment: Money,
}

/// Recompute ownership percentages from commitments, pro-rata.
///
/// Percentages are rounded to four decimal places; the final investor
/// absorbs the drift so the result sums to exactly 100. A zero total
/// commitment yields all-zero stakes rather than dividing.
pub fn recompute_ownership(
    commitments: &[InvestorCommitment],
) -> FundAdminResult<Vec<InvestorStake>> {
    for c in commitments {
        if c.commitment < Decimal::ZERO {
            return Err(FundAdminError::InvalidInput {
                field: "commitment".into(),
                reason: format!("Commitment for {} cannot be negative", c.investor_id),
            });
        }
    }

    let total: Decimal = commitments.iter().map(|c| c.commitment).sum();
    if total.is_zero() {
        return Ok(commitments
            .iter()
            .map(|c| InvestorStake {
                investor_id: c.investor_id,
                ownership_pct: Decimal::ZERO,
            })
            .collect());
    }

    let mut stakes = Vec::with_capacity(commitments.len());
    let mut assigned = Decimal::ZERO;
    let last = commitments.len() - 1;
    for (i, c) in commitments.iter().enumerate() {
        let pct = if i == last {
            dec!(100) - assigned
        } else {
            (c.commitment / total * dec!(100))
                .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
        };
        assigned += pct;
        stakes.push(InvestorStake {
            investor_id: c.investor_id,
            ownership_pct: pct,
        });
    }
    Ok(stakes)
}
