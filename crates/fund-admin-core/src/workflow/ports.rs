use uuid::Uuid;

use crate::workflow::model::{
    Allocation, ApprovalAction, ApprovalHistoryEntry, ApprovalStatus, DistributionTiers,
    EntityKind, Transaction,
};
use crate::FundAdminResult;

/// Event handed to downstream systems (documents, email) after a committed
/// transition. Consumed fire-and-forget; never awaited for correctness.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub entity: EntityKind,
    pub entity_id: Uuid,
    pub action: ApprovalAction,
    pub from_status: ApprovalStatus,
    pub to_status: ApprovalStatus,
    pub actor_id: Uuid,
}

/// Outbound notification port. Failures are logged by the caller and never
/// escalated; the transition is already committed when this runs.
pub trait NotificationPort {
    fn transition_occurred(&self, event: &TransitionEvent) -> Result<(), String>;
}

/// Default no-op notifier.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl NotificationPort for NullNotifier {
    fn transition_occurred(&self, _event: &TransitionEvent) -> Result<(), String> {
        Ok(())
    }
}

/// Persistence port for transactions, allocations and the audit trail.
///
/// The two `commit_*` methods are the atomic units of the workflow: each
/// performs its compare-and-swap precondition check, the record write and
/// the history append as one failure-atomic operation. An implementation
/// must guarantee that state and history never diverge, and that of two
/// concurrent commits against the same precondition exactly one succeeds;
/// the loser observes a state-conflict (or already-applied) error.
pub trait TransactionStore {
    fn load(&self, id: Uuid) -> FundAdminResult<Transaction>;

    fn insert(&self, transaction: Transaction) -> FundAdminResult<()>;

    /// Set the status to `next` if and only if the persisted status still
    /// equals `expected`, appending `entry` in the same unit.
    fn commit_transition(
        &self,
        id: Uuid,
        expected: ApprovalStatus,
        next: ApprovalStatus,
        entry: ApprovalHistoryEntry,
    ) -> FundAdminResult<Transaction>;

    /// Mark a distribution's waterfall as applied if and only if it is not
    /// already, writing tier amounts, allocations and `entry` in the same
    /// unit.
    fn commit_waterfall(
        &self,
        id: Uuid,
        tiers: DistributionTiers,
        allocations: Vec<Allocation>,
        entry: ApprovalHistoryEntry,
    ) -> FundAdminResult<Transaction>;

    fn insert_allocations(&self, allocations: Vec<Allocation>) -> FundAdminResult<()>;

    fn history(&self, entity_id: Uuid) -> FundAdminResult<Vec<ApprovalHistoryEntry>>;

    fn allocations(&self, transaction_id: Uuid) -> FundAdminResult<Vec<Allocation>>;
}
