use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundAdminError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unauthorized: {role} may not {action}")]
    Unauthorized { role: String, action: String },

    #[error("State conflict on {entity}: expected {expected}, found {actual}")]
    StateConflict {
        entity: String,
        expected: String,
        actual: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Already applied: {entity} {id}")]
    AlreadyApplied { entity: String, id: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FundAdminError {
    fn from(e: serde_json::Error) -> Self {
        FundAdminError::SerializationError(e.to_string())
    }
}
