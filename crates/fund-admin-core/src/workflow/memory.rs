use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::FundAdminError;
use crate::workflow::model::{
    Allocation, ApprovalHistoryEntry, ApprovalStatus, DistributionTiers, Transaction,
    TransactionDetail,
};
use crate::workflow::ports::TransactionStore;
use crate::FundAdminResult;

/// In-memory `TransactionStore` with compare-and-swap commit semantics.
///
/// All state lives behind a single mutex, so each commit's precondition
/// check and writes are one atomic unit, matching the contract a real
/// backing store must provide with conditional writes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    transactions: HashMap<Uuid, Transaction>,
    history: Vec<ApprovalHistoryEntry>,
    allocations: Vec<Allocation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> FundAdminResult<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| FundAdminError::StoreFailure("store lock poisoned".into()))
    }
}

impl TransactionStore for InMemoryStore {
    fn load(&self, id: Uuid) -> FundAdminResult<Transaction> {
        let inner = self.lock()?;
        inner
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| FundAdminError::NotFound {
                entity: "transaction".into(),
                id: id.to_string(),
            })
    }

    fn insert(&self, transaction: Transaction) -> FundAdminResult<()> {
        let mut inner = self.lock()?;
        inner.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    fn commit_transition(
        &self,
        id: Uuid,
        expected: ApprovalStatus,
        next: ApprovalStatus,
        entry: ApprovalHistoryEntry,
    ) -> FundAdminResult<Transaction> {
        let mut inner = self.lock()?;
        let txn = inner
            .transactions
            .get_mut(&id)
            .ok_or_else(|| FundAdminError::NotFound {
                entity: "transaction".into(),
                id: id.to_string(),
            })?;

        if txn.status != expected {
            return Err(FundAdminError::StateConflict {
                entity: format!("{} {}", txn.entity_kind(), id),
                expected: expected.to_string(),
                actual: txn.status.to_string(),
            });
        }

        txn.status = next;
        txn.updated_at = entry.recorded_at;
        let updated = txn.clone();
        inner.history.push(entry);
        Ok(updated)
    }

    fn commit_waterfall(
        &self,
        id: Uuid,
        tiers: DistributionTiers,
        allocations: Vec<Allocation>,
        entry: ApprovalHistoryEntry,
    ) -> FundAdminResult<Transaction> {
        let mut inner = self.lock()?;
        let txn = inner
            .transactions
            .get_mut(&id)
            .ok_or_else(|| FundAdminError::NotFound {
                entity: "transaction".into(),
                id: id.to_string(),
            })?;

        match &mut txn.detail {
            TransactionDetail::Distribution {
                waterfall_applied,
                tiers: stored_tiers,
            } => {
                if *waterfall_applied {
                    return Err(FundAdminError::AlreadyApplied {
                        entity: "distribution".into(),
                        id: id.to_string(),
                    });
                }
                *waterfall_applied = true;
                *stored_tiers = Some(tiers);
            }
            TransactionDetail::CapitalCall { .. } => {
                return Err(FundAdminError::InvalidInput {
                    field: "id".into(),
                    reason: format!("Transaction {id} is not a distribution"),
                });
            }
        }

        txn.updated_at = entry.recorded_at;
        let updated = txn.clone();
        inner.allocations.extend(allocations);
        inner.history.push(entry);
        Ok(updated)
    }

    fn insert_allocations(&self, allocations: Vec<Allocation>) -> FundAdminResult<()> {
        let mut inner = self.lock()?;
        inner.allocations.extend(allocations);
        Ok(())
    }

    fn history(&self, entity_id: Uuid) -> FundAdminResult<Vec<ApprovalHistoryEntry>> {
        let inner = self.lock()?;
        let mut entries: Vec<ApprovalHistoryEntry> = inner
            .history
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.recorded_at);
        Ok(entries)
    }

    fn allocations(&self, transaction_id: Uuid) -> FundAdminResult<Vec<Allocation>> {
        let inner = self.lock()?;
        Ok(inner
            .allocations
            .iter()
            .filter(|a| a.transaction_id == transaction_id)
            .cloned()
            .collect())
    }
}
