pub mod fees;
pub mod performance;
pub mod waterfall;
