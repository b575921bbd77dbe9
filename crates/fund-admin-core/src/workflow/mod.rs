pub mod audit;
pub mod memory;
pub mod model;
pub mod ports;
pub mod state_machine;

pub use audit::replay_history;
pub use memory::InMemoryStore;
pub use model::{
    Actor, Allocation, AllocationStatus, ApprovalAction, ApprovalHistoryEntry, ApprovalStatus,
    DistributionTiers, EntityKind, FundContext, Role, Transaction, TransactionDetail,
};
pub use ports::{NotificationPort, NullNotifier, TransactionStore, TransitionEvent};
pub use state_machine::{
    ApprovalStateMachine, CallAllocationApplication, TransitionOutcome, TransitionRequest,
    WaterfallApplication, WaterfallRequest,
};
