pub mod performance;

pub use performance::{compute_performance, PerformanceInput, PerformanceOutput};
