pub mod error;
pub mod investors;
pub mod types;

#[cfg(feature = "fees")]
pub mod fees;

#[cfg(feature = "waterfall")]
pub mod waterfall;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "workflow")]
pub mod workflow;

pub use error::FundAdminError;
pub use types::*;

/// Standard result type for all fund-admin operations
pub type FundAdminResult<T> = Result<T, FundAdminError>;
