use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use crate::error::FundAdminError;
use crate::types::*;
use crate::FundAdminResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Base against which a management fee accrues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    Committed,
    Invested,
    NicPlusUnfunded,
}

/// Fee configuration carried on a capital call.
///
/// `rate` and `vat_rate` are percentages (2 = 2%). The principal handed to
/// the calculator is already period-adjusted upstream; `period_label` is
/// reporting metadata only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Management fee rate as a percentage of principal
    pub rate: Rate,
    pub basis: FeeBasis,
    /// VAT rate as a percentage of the net fee
    pub vat_rate: Rate,
    pub vat_applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_label: Option<String>,
    /// When present, the dual-rate path replaces the standard gross formula
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual_rate: Option<DualRateTerms>,
}

/// Dual-rate fee terms: separate rates on net invested capital and on the
/// unfunded commitment. Rates here are decimal fractions (0.02 = 2%) and
/// apply directly, without the percentage division of the standard path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualRateTerms {
    pub net_invested_capital: Money,
    pub unfunded_commitment: Money,
    pub rate_on_nic: Rate,
    pub rate_on_unfunded: Rate,
    /// GP-side offset for fees already charged elsewhere, subtracted before VAT
    #[serde(default)]
    pub fee_offset: Money,
}

/// Investor-specific fee overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestorTerms {
    /// Discount on the gross fee, as a percentage (10 = 10% off)
    pub fee_discount_pct: Rate,
    pub vat_exempt: bool,
}

/// Input for a single fee computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeInput {
    /// Principal the fee accrues on, already period-adjusted
    pub principal: Money,
    pub config: FeeConfig,
    #[serde(default)]
    pub terms: InvestorTerms,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Fee breakdown, every amount rounded to the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub gross: Money,
    pub discount: Money,
    pub net: Money,
    pub vat: Money,
    pub total: Money,
}

impl FeeBreakdown {
    pub fn zero() -> Self {
        FeeBreakdown {
            gross: Decimal::ZERO,
            discount: Decimal::ZERO,
            net: Decimal::ZERO,
            vat: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

const HUNDRED: Decimal = dec!(100);

/// Calculate a management fee breakdown for one investor.
///
/// Standard path: `gross = principal × rate / 100`, then discount, VAT and
/// total. Dual-rate path (when `config.dual_rate` is present):
/// `gross = nic × rate_on_nic + unfunded × rate_on_unfunded − fee_offset`,
/// after which discount and VAT apply identically. A negative gross is
/// clamped to zero and reported as a data-quality warning, never silently.
pub fn compute_fees(input: &FeeInput) -> FundAdminResult<ComputationOutput<FeeBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let terms = &input.terms;
    let config = &input.config;

    let mut gross = match &config.dual_rate {
        Some(dual) => {
            dual.net_invested_capital * dual.rate_on_nic
                + dual.unfunded_commitment * dual.rate_on_unfunded
                - dual.fee_offset
        }
        None => input.principal * config.rate / HUNDRED,
    };

    if gross < Decimal::ZERO {
        warnings.push(format!(
            "Gross fee of {gross} clamped to zero; fee offset exceeds accrued fees"
        ));
        tracing::warn!(gross = %gross, "negative gross fee clamped to zero");
        gross = Decimal::ZERO;
    }

    let discount = gross * terms.fee_discount_pct / HUNDRED;
    let net = gross - discount;
    let vat = if config.vat_applicable && !terms.vat_exempt {
        net * config.vat_rate / HUNDRED
    } else {
        Decimal::ZERO
    };
    let total = net + vat;

    // Total is the sum of the rounded parts so the printed figures reconcile
    let breakdown = FeeBreakdown {
        gross: round_currency(gross),
        discount: round_currency(discount),
        net: round_currency(net),
        vat: round_currency(vat),
        total: round_currency(net) + round_currency(vat),
    };

    let methodology = match &config.dual_rate {
        Some(_) => "Management Fee (dual-rate: NIC + unfunded commitment)",
        None => "Management Fee (flat rate on period-adjusted principal)",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "rate": config.rate.to_string(),
            "basis": config.basis,
            "vat_rate": config.vat_rate.to_string(),
            "vat_applicable": config.vat_applicable,
            "fee_discount_pct": terms.fee_discount_pct.to_string(),
            "vat_exempt": terms.vat_exempt,
            "dual_rate": config.dual_rate.is_some(),
        }),
        warnings,
        elapsed,
        breakdown,
    ))
}

fn validate(input: &FeeInput) -> FundAdminResult<()> {
    if input.principal < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if input.config.rate < Decimal::ZERO || input.config.rate > HUNDRED {
        return Err(FundAdminError::InvalidInput {
            field: "rate".into(),
            reason: "Fee rate must be between 0 and 100 percent".into(),
        });
    }
    if input.config.vat_rate < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "vat_rate".into(),
            reason: "VAT rate cannot be negative".into(),
        });
    }
    if input.terms.fee_discount_pct < Decimal::ZERO || input.terms.fee_discount_pct > HUNDRED {
        return Err(FundAdminError::InvalidInput {
            field: "fee_discount_pct".into(),
            reason: "Fee discount must be between 0 and 100 percent".into(),
        });
    }
    if let Some(dual) = &input.config.dual_rate {
        if dual.net_invested_capital < Decimal::ZERO {
            return Err(FundAdminError::InvalidInput {
                field: "net_invested_capital".into(),
                reason: "Net invested capital cannot be negative".into(),
            });
        }
        if dual.unfunded_commitment < Decimal::ZERO {
            return Err(FundAdminError::InvalidInput {
                field: "unfunded_commitment".into(),
                reason: "Unfunded commitment cannot be negative".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Capital call allocation
// ---------------------------------------------------------------------------

/// One investor's position for call allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorPosition {
    pub investor_id: Uuid,
    /// Ownership percentage (0-100); positions must sum to 100
    pub ownership_pct: Rate,
    #[serde(default)]
    pub terms: InvestorTerms,
}

/// Input for spreading a capital call across investors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAllocationInput {
    pub call_total: Money,
    pub config: FeeConfig,
    pub investors: Vec<InvestorPosition>,
}

/// Per-investor slice of a capital call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAllocation {
    pub investor_id: Uuid,
    pub ownership_pct: Rate,
    pub principal: Money,
    pub fees: FeeBreakdown,
    /// Principal plus total fees
    pub amount_due: Money,
}

/// Result of allocating a capital call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAllocationOutput {
    pub allocations: Vec<CallAllocation>,
    pub total_principal: Money,
    pub total_fees: Money,
}

/// Spread a capital call across investors pro-rata by ownership percentage,
/// computing a fee breakdown per investor under that investor's terms.
///
/// Principal amounts are rounded per investor; the final investor absorbs
/// the rounding drift so that principals reconcile exactly to the call total.
pub fn allocate_call(
    input: &CallAllocationInput,
) -> FundAdminResult<ComputationOutput<CallAllocationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.call_total < Decimal::ZERO {
        return Err(FundAdminError::InvalidInput {
            field: "call_total".into(),
            reason: "Call total cannot be negative".into(),
        });
    }
    if input.investors.is_empty() {
        return Err(FundAdminError::InvalidInput {
            field: "investors".into(),
            reason: "At least one investor position is required".into(),
        });
    }
    let pct_sum: Decimal = input.investors.iter().map(|p| p.ownership_pct).sum();
    if (pct_sum - HUNDRED).abs() > dec!(0.01) {
        return Err(FundAdminError::InvalidInput {
            field: "investors".into(),
            reason: format!("Ownership percentages must sum to 100, got {pct_sum}"),
        });
    }

    let mut allocations: Vec<CallAllocation> = Vec::with_capacity(input.investors.len());
    let mut allocated = Decimal::ZERO;
    let mut total_fees = Decimal::ZERO;
    let last = input.investors.len() - 1;

    for (i, position) in input.investors.iter().enumerate() {
        let principal = if i == last {
            // Last investor absorbs rounding drift
            input.call_total - allocated
        } else {
            round_currency(input.call_total * position.ownership_pct / HUNDRED)
        };
        allocated += principal;

        let fee_output = compute_fees(&FeeInput {
            principal,
            config: input.config.clone(),
            terms: position.terms.clone(),
        })?;
        warnings.extend(fee_output.warnings);
        let fees = fee_output.result;

        total_fees += fees.total;
        allocations.push(CallAllocation {
            investor_id: position.investor_id,
            ownership_pct: position.ownership_pct,
            principal,
            amount_due: principal + fees.total,
            fees,
        });
    }

    let output = CallAllocationOutput {
        allocations,
        total_principal: allocated,
        total_fees,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital Call Allocation (pro-rata by ownership)",
        &serde_json::json!({
            "call_total": input.call_total.to_string(),
            "num_investors": input.investors.len(),
            "fee_rate": input.config.rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_config(rate: Rate, vat_rate: Rate, vat_applicable: bool) -> FeeConfig {
        FeeConfig {
            rate,
            basis: FeeBasis::Committed,
            vat_rate,
            vat_applicable,
            period_label: None,
            dual_rate: None,
        }
    }

    #[test]
    fn test_standard_fee_known_answer() {
        // principal=100,000, rate=2%, no discount, VAT 16% applicable
        let input = FeeInput {
            principal: dec!(100000),
            config: standard_config(dec!(2), dec!(16), true),
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.gross, dec!(2000.00));
        assert_eq!(out.discount, dec!(0.00));
        assert_eq!(out.net, dec!(2000.00));
        assert_eq!(out.vat, dec!(320.00));
        assert_eq!(out.total, dec!(2320.00));
    }

    #[test]
    fn test_discount_applies_before_vat() {
        let input = FeeInput {
            principal: dec!(100000),
            config: standard_config(dec!(2), dec!(16), true),
            terms: InvestorTerms {
                fee_discount_pct: dec!(25),
                vat_exempt: false,
            },
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.gross, dec!(2000.00));
        assert_eq!(out.discount, dec!(500.00));
        assert_eq!(out.net, dec!(1500.00));
        // VAT on the net, not the gross
        assert_eq!(out.vat, dec!(240.00));
        assert_eq!(out.total, dec!(1740.00));
    }

    #[test]
    fn test_vat_exempt_investor() {
        let input = FeeInput {
            principal: dec!(50000),
            config: standard_config(dec!(2), dec!(16), true),
            terms: InvestorTerms {
                fee_discount_pct: Decimal::ZERO,
                vat_exempt: true,
            },
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.vat, dec!(0.00));
        assert_eq!(out.total, out.net);
    }

    #[test]
    fn test_vat_not_applicable() {
        let input = FeeInput {
            principal: dec!(50000),
            config: standard_config(dec!(2), dec!(16), false),
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.vat, dec!(0.00));
    }

    #[test]
    fn test_zero_principal_zero_fee() {
        let input = FeeInput {
            principal: Decimal::ZERO,
            config: standard_config(dec!(2), dec!(16), true),
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out, FeeBreakdown::zero());
    }

    #[test]
    fn test_dual_rate_path() {
        // nic 600k @ 1.5% + unfunded 400k @ 0.75% = 9,000 + 3,000 = 12,000
        let input = FeeInput {
            principal: dec!(1000000),
            config: FeeConfig {
                rate: dec!(2),
                basis: FeeBasis::NicPlusUnfunded,
                vat_rate: dec!(16),
                vat_applicable: true,
                period_label: None,
                dual_rate: Some(DualRateTerms {
                    net_invested_capital: dec!(600000),
                    unfunded_commitment: dec!(400000),
                    rate_on_nic: dec!(0.015),
                    rate_on_unfunded: dec!(0.0075),
                    fee_offset: Decimal::ZERO,
                }),
            },
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.gross, dec!(12000.00));
        assert_eq!(out.vat, dec!(1920.00));
        assert_eq!(out.total, dec!(13920.00));
    }

    #[test]
    fn test_fee_offset_subtracted_before_vat() {
        let input = FeeInput {
            principal: dec!(1000000),
            config: FeeConfig {
                rate: dec!(2),
                basis: FeeBasis::NicPlusUnfunded,
                vat_rate: dec!(16),
                vat_applicable: true,
                period_label: None,
                dual_rate: Some(DualRateTerms {
                    net_invested_capital: dec!(600000),
                    unfunded_commitment: dec!(400000),
                    rate_on_nic: dec!(0.015),
                    rate_on_unfunded: dec!(0.0075),
                    fee_offset: dec!(2000),
                }),
            },
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.gross, dec!(10000.00));
        assert_eq!(out.vat, dec!(1600.00));
    }

    #[test]
    fn test_negative_gross_clamped_with_warning() {
        // Offset larger than the accrued fee
        let input = FeeInput {
            principal: dec!(1000000),
            config: FeeConfig {
                rate: dec!(2),
                basis: FeeBasis::NicPlusUnfunded,
                vat_rate: dec!(16),
                vat_applicable: true,
                period_label: None,
                dual_rate: Some(DualRateTerms {
                    net_invested_capital: dec!(100000),
                    unfunded_commitment: Decimal::ZERO,
                    rate_on_nic: dec!(0.01),
                    rate_on_unfunded: Decimal::ZERO,
                    fee_offset: dec!(5000),
                }),
            },
            terms: InvestorTerms::default(),
        };
        let output = compute_fees(&input).unwrap();
        assert_eq!(output.result, FeeBreakdown::zero());
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_rounding_half_up() {
        // 12,345 * 2% = 246.90; 246.90 * 16% VAT = 39.504 -> 39.50
        // 0.125% of 999 = 1.24875 -> gross 1.25
        let input = FeeInput {
            principal: dec!(999),
            config: standard_config(dec!(0.125), dec!(0), false),
            terms: InvestorTerms::default(),
        };
        let out = compute_fees(&input).unwrap().result;
        assert_eq!(out.gross, dec!(1.25));
    }

    #[test]
    fn test_negative_principal_rejected() {
        let input = FeeInput {
            principal: dec!(-1),
            config: standard_config(dec!(2), dec!(16), true),
            terms: InvestorTerms::default(),
        };
        match compute_fees(&input).unwrap_err() {
            FundAdminError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_allocation_reconciles_to_call_total() {
        let investors: Vec<InvestorPosition> = (0..3)
            .map(|_| InvestorPosition {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(33.3333),
                terms: InvestorTerms::default(),
            })
            .collect();
        let mut investors = investors;
        // Third investor takes the remainder of the percentage
        investors[2].ownership_pct = dec!(33.3334);

        let input = CallAllocationInput {
            call_total: dec!(1000000),
            config: standard_config(dec!(2), dec!(16), true),
            investors,
        };
        let out = allocate_call(&input).unwrap().result;
        let principal_sum: Decimal = out.allocations.iter().map(|a| a.principal).sum();
        assert_eq!(principal_sum, dec!(1000000));
        assert_eq!(out.total_principal, dec!(1000000));
    }

    #[test]
    fn test_allocation_honors_investor_terms() {
        let exempt = Uuid::new_v4();
        let input = CallAllocationInput {
            call_total: dec!(200000),
            config: standard_config(dec!(2), dec!(16), true),
            investors: vec![
                InvestorPosition {
                    investor_id: exempt,
                    ownership_pct: dec!(50),
                    terms: InvestorTerms {
                        fee_discount_pct: Decimal::ZERO,
                        vat_exempt: true,
                    },
                },
                InvestorPosition {
                    investor_id: Uuid::new_v4(),
                    ownership_pct: dec!(50),
                    terms: InvestorTerms::default(),
                },
            ],
        };
        let out = allocate_call(&input).unwrap().result;
        let exempt_alloc = out
            .allocations
            .iter()
            .find(|a| a.investor_id == exempt)
            .unwrap();
        assert_eq!(exempt_alloc.fees.vat, dec!(0.00));
        let other = out
            .allocations
            .iter()
            .find(|a| a.investor_id != exempt)
            .unwrap();
        assert_eq!(other.fees.vat, dec!(320.00));
    }

    #[test]
    fn test_allocation_rejects_bad_percentages() {
        let input = CallAllocationInput {
            call_total: dec!(100),
            config: standard_config(dec!(2), dec!(0), false),
            investors: vec![InvestorPosition {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(70),
                terms: InvestorTerms::default(),
            }],
        };
        assert!(allocate_call(&input).is_err());
    }
}
