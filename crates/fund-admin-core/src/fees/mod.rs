pub mod management_fee;

pub use management_fee::{
    allocate_call, compute_fees, CallAllocation, CallAllocationInput, CallAllocationOutput,
    DualRateTerms, FeeBasis, FeeBreakdown, FeeConfig, FeeInput, InvestorPosition, InvestorTerms,
};
