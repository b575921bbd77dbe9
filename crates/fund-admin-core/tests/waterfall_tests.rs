use fund_admin_core::types::InvestorStake;
use fund_admin_core::waterfall::{accrued_preferred, calculate_waterfall, WaterfallInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

// ===========================================================================
// Waterfall engine tests — tier ordering, conservation, allocation
// ===========================================================================

fn stakes(pcts: &[Decimal]) -> Vec<InvestorStake> {
    pcts.iter()
        .map(|pct| InvestorStake {
            investor_id: Uuid::new_v4(),
            ownership_pct: *pct,
        })
        .collect()
}

fn input(distributable: Decimal, unreturned: Decimal, pref: Decimal) -> WaterfallInput {
    WaterfallInput {
        total_distributable: distributable,
        unreturned_capital: unreturned,
        preferred_owed: pref,
        carry_rate: dec!(0.20),
        catch_up_rate: dec!(1.0),
        gp_commitment_pct: dec!(0.02),
        management_fee_at_exit: None,
        investors: stakes(&[dec!(50), dec!(30), dec!(20)]),
    }
}

#[test]
fn test_tiers_sum_to_total_distributed() {
    for (d, u, p) in [
        (dec!(200), dec!(100), dec!(8)),
        (dec!(60), dec!(100), dec!(8)),
        (dec!(105), dec!(100), dec!(8)),
        (dec!(1000000), dec!(250000), dec!(40000)),
        (dec!(0.01), dec!(100), dec!(8)),
    ] {
        let out = calculate_waterfall(&input(d, u, p)).unwrap().result;
        let tier_sum: Decimal = out.tiers.iter().map(|t| t.amount).sum();
        assert_eq!(tier_sum, d, "tiers must consume exactly {d}");
        assert_eq!(out.total_to_gp + out.total_to_lp, d);
    }
}

#[test]
fn test_tier_order_is_strict() {
    // 150 against 100 capital and 8 pref: ROC fills first, then pref,
    // then catch-up, residual takes the rest
    let out = calculate_waterfall(&input(dec!(150), dec!(100), dec!(8)))
        .unwrap()
        .result;
    assert_eq!(out.tiers[0].amount, dec!(100));
    assert_eq!(out.tiers[1].amount, dec!(8));
    assert!(out.tiers[2].amount > Decimal::ZERO);
    assert!(out.tiers[3].amount > Decimal::ZERO);

    // Remaining balances never go negative
    let mut prev = dec!(150);
    for tier in &out.tiers {
        assert!(tier.remaining_after >= Decimal::ZERO);
        assert!(tier.remaining_after <= prev);
        prev = tier.remaining_after;
    }
}

#[test]
fn test_investor_allocation_within_tolerance() {
    let mut wf = input(dec!(1000000.37), dec!(600000), dec!(48000));
    wf.investors = stakes(&[dec!(33.33), dec!(33.33), dec!(33.34)]);
    let out = calculate_waterfall(&wf).unwrap().result;

    let alloc_sum: Decimal = out.allocations.iter().map(|a| a.amount).sum();
    // One currency unit of tolerance per investor
    let tolerance = dec!(0.01) * Decimal::from(out.allocations.len() as i64);
    assert!((alloc_sum - out.total_to_lp).abs() <= tolerance);
}

#[test]
fn test_gp_gets_carry_share_of_residual() {
    let out = calculate_waterfall(&input(dec!(300), dec!(100), dec!(8)))
        .unwrap()
        .result;
    let residual = &out.tiers[3];
    assert_eq!(residual.to_gp, residual.amount * dec!(0.20));
    assert_eq!(residual.to_lp, residual.amount - residual.to_gp);
}

#[test]
fn test_accrued_preferred_two_years() {
    // 1,000,000 at 8% compounded for 2 years = 166,400
    let owed =
        accrued_preferred(dec!(1000000), dec!(0.08), dec!(2), Decimal::ZERO).unwrap();
    assert!((owed - dec!(166400)).abs() < dec!(1));
}
