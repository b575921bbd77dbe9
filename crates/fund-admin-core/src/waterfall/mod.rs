pub mod distribution;

pub use distribution::{
    accrued_preferred, calculate_waterfall, InvestorDistribution, TierResult, WaterfallInput,
    WaterfallOutput, WaterfallTier,
};
