use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FundAdminError;
use crate::fees::{allocate_call, CallAllocationInput, CallAllocationOutput, InvestorPosition};
use crate::types::*;
use crate::waterfall::{calculate_waterfall, WaterfallInput, WaterfallOutput, WaterfallTier};
use crate::workflow::model::{
    Actor, Allocation, ApprovalAction, ApprovalHistoryEntry, ApprovalStatus, DistributionTiers,
    FundContext, Role, Transaction, TransactionDetail,
};
use crate::workflow::ports::{NotificationPort, TransactionStore, TransitionEvent};
use crate::FundAdminResult;

// ---------------------------------------------------------------------------
// Request / outcome types
// ---------------------------------------------------------------------------

/// Generic transition request for the single-entry dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransitionRequest {
    SubmitForReview,
    Approve { require_cfo: bool },
    CfoApprove,
    Reject { reason: String },
    RequestChanges { notes: String },
}

/// Result of a committed transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub transaction: Transaction,
    pub audit_entry: ApprovalHistoryEntry,
}

/// Fund-level figures needed to run a distribution's waterfall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallRequest {
    /// Called capital not yet returned to investors
    pub unreturned_capital: Money,
    /// Compounded preferred return accrued and not yet satisfied
    pub preferred_owed: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_fee_at_exit: Option<Money>,
    pub investors: Vec<InvestorStake>,
}

/// Result of applying a distribution waterfall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallApplication {
    pub transaction: Transaction,
    pub waterfall: ComputationOutput<WaterfallOutput>,
    pub allocations: Vec<Allocation>,
    pub audit_entry: ApprovalHistoryEntry,
}

/// Result of allocating an approved capital call across investors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAllocationApplication {
    pub transaction: Transaction,
    pub breakdown: ComputationOutput<CallAllocationOutput>,
    pub allocations: Vec<Allocation>,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Validates and executes approval transitions on capital calls and
/// distributions.
///
/// Every operation re-reads the persisted record, authorizes the actor
/// against it, and commits the status change and audit entry through the
/// store's compare-and-swap primitive, so concurrent writers cannot both
/// succeed and history never diverges from state. Notification dispatch is
/// fire-and-forget after the commit.
pub struct ApprovalStateMachine<'a, S: TransactionStore, N: NotificationPort> {
    store: &'a S,
    notifier: &'a N,
}

impl<'a, S: TransactionStore, N: NotificationPort> ApprovalStateMachine<'a, S, N> {
    pub fn new(store: &'a S, notifier: &'a N) -> Self {
        ApprovalStateMachine { store, notifier }
    }

    /// Submit a draft transaction for review.
    pub fn submit_for_review(&self, id: Uuid, actor: &Actor) -> FundAdminResult<TransitionOutcome> {
        let txn = self.load_expecting(id, ApprovalStatus::Draft)?;
        self.authorize(actor, &txn, "submit for review")?;
        self.commit(
            txn,
            ApprovalStatus::PendingReview,
            ApprovalAction::Submitted,
            actor,
            None,
        )
    }

    /// Approve a transaction under review. With `require_cfo` the
    /// transaction moves to the CFO approval stage instead of final
    /// approval.
    pub fn approve(
        &self,
        id: Uuid,
        actor: &Actor,
        require_cfo: bool,
    ) -> FundAdminResult<TransitionOutcome> {
        let txn = self.load_expecting(id, ApprovalStatus::PendingReview)?;
        self.authorize(actor, &txn, "approve")?;
        let (next, action) = if require_cfo {
            (ApprovalStatus::PendingCfo, ApprovalAction::CfoSubmitted)
        } else {
            (ApprovalStatus::Approved, ApprovalAction::Approved)
        };
        self.commit(txn, next, action, actor, None)
    }

    /// Final approval at the CFO stage. CFO role only.
    pub fn cfo_approve(&self, id: Uuid, actor: &Actor) -> FundAdminResult<TransitionOutcome> {
        let txn = self.load_expecting(id, ApprovalStatus::PendingCfo)?;
        self.authorize(actor, &txn, "approve at the CFO stage")?;
        self.commit(
            txn,
            ApprovalStatus::Approved,
            ApprovalAction::CfoApproved,
            actor,
            None,
        )
    }

    /// Reject a transaction under review or CFO approval. The reason is
    /// mandatory.
    pub fn reject(&self, id: Uuid, actor: &Actor, reason: &str) -> FundAdminResult<TransitionOutcome> {
        if reason.trim().is_empty() {
            return Err(FundAdminError::InvalidInput {
                field: "reason".into(),
                reason: "A rejection reason is required".into(),
            });
        }
        let txn = self.load_in_review(id)?;
        self.authorize(actor, &txn, "reject")?;
        self.commit(
            txn,
            ApprovalStatus::Rejected,
            ApprovalAction::Rejected,
            actor,
            Some(reason.trim().to_string()),
        )
    }

    /// Send a transaction back to draft for rework. The notes are
    /// mandatory.
    pub fn request_changes(
        &self,
        id: Uuid,
        actor: &Actor,
        notes: &str,
    ) -> FundAdminResult<TransitionOutcome> {
        if notes.trim().is_empty() {
            return Err(FundAdminError::InvalidInput {
                field: "notes".into(),
                reason: "Change-request notes are required".into(),
            });
        }
        let txn = self.load_in_review(id)?;
        self.authorize(actor, &txn, "request changes")?;
        self.commit(
            txn,
            ApprovalStatus::Draft,
            ApprovalAction::ChangesRequested,
            actor,
            Some(notes.trim().to_string()),
        )
    }

    /// Single-entry dispatcher over the named operations.
    pub fn transition(
        &self,
        id: Uuid,
        actor: &Actor,
        request: TransitionRequest,
    ) -> FundAdminResult<TransitionOutcome> {
        match request {
            TransitionRequest::SubmitForReview => self.submit_for_review(id, actor),
            TransitionRequest::Approve { require_cfo } => self.approve(id, actor, require_cfo),
            TransitionRequest::CfoApprove => self.cfo_approve(id, actor),
            TransitionRequest::Reject { reason } => self.reject(id, actor, &reason),
            TransitionRequest::RequestChanges { notes } => {
                self.request_changes(id, actor, &notes)
            }
        }
    }

    /// Run the waterfall on an approved distribution, exactly once.
    ///
    /// The once-only check and the writes (flag, tier amounts, allocations,
    /// audit entry) are one atomic store commit; a concurrent second
    /// application loses with an already-applied error and the first
    /// application's allocations are untouched.
    pub fn apply_waterfall(
        &self,
        id: Uuid,
        actor: &Actor,
        ctx: &FundContext,
        request: &WaterfallRequest,
    ) -> FundAdminResult<WaterfallApplication> {
        let txn = self.store.load(id)?;

        let applied = match &txn.detail {
            TransactionDetail::Distribution {
                waterfall_applied, ..
            } => *waterfall_applied,
            TransactionDetail::CapitalCall { .. } => {
                return Err(FundAdminError::InvalidInput {
                    field: "id".into(),
                    reason: format!("Transaction {id} is not a distribution"),
                });
            }
        };
        if txn.status != ApprovalStatus::Approved {
            return Err(FundAdminError::StateConflict {
                entity: format!("{} {}", txn.entity_kind(), id),
                expected: ApprovalStatus::Approved.to_string(),
                actual: txn.status.to_string(),
            });
        }
        // Pre-check for a clear error; the store re-checks atomically
        if applied {
            return Err(FundAdminError::AlreadyApplied {
                entity: "distribution".into(),
                id: id.to_string(),
            });
        }
        self.authorize(actor, &txn, "apply waterfall")?;

        let waterfall = calculate_waterfall(&WaterfallInput {
            total_distributable: txn.total,
            unreturned_capital: request.unreturned_capital,
            preferred_owed: request.preferred_owed,
            carry_rate: ctx.carry_rate,
            catch_up_rate: ctx.catch_up_rate,
            gp_commitment_pct: ctx.gp_commitment_pct,
            management_fee_at_exit: request.management_fee_at_exit,
            investors: request.investors.clone(),
        })?;

        let tiers = DistributionTiers {
            return_of_capital: waterfall.result.tier_amount(WaterfallTier::ReturnOfCapital),
            preferred_return: waterfall.result.tier_amount(WaterfallTier::PreferredReturn),
            gp_catch_up: waterfall.result.tier_amount(WaterfallTier::GpCatchUp),
            residual_split: waterfall.result.tier_amount(WaterfallTier::ResidualSplit),
            lp_total: waterfall.result.total_to_lp,
            gp_total: waterfall.result.total_to_gp,
        };

        let allocations: Vec<Allocation> = waterfall
            .result
            .allocations
            .iter()
            .map(|a| {
                Allocation::new(
                    txn.id,
                    a.investor_id,
                    a.ownership_pct,
                    a.amount,
                    None,
                    a.amount,
                )
            })
            .collect();

        let entry = ApprovalHistoryEntry::new(
            txn.entity_kind(),
            txn.id,
            ApprovalAction::WaterfallApplied,
            txn.status,
            txn.status,
            actor,
            None,
        )
        .with_metadata(serde_json::json!({
            "lp_total": tiers.lp_total.to_string(),
            "gp_total": tiers.gp_total.to_string(),
        }));

        let updated =
            self.store
                .commit_waterfall(txn.id, tiers, allocations.clone(), entry.clone())?;
        tracing::info!(distribution = %txn.id, lp_total = %waterfall.result.total_to_lp, "waterfall applied");
        self.emit(&updated, &entry);

        Ok(WaterfallApplication {
            transaction: updated,
            waterfall,
            allocations,
            audit_entry: entry,
        })
    }

    /// Create the per-investor allocation rows for an approved capital
    /// call, exactly once.
    ///
    /// Principal spreads pro-rata by ownership; each investor's fee
    /// breakdown honors that investor's discount and VAT terms.
    pub fn allocate_capital_call(
        &self,
        id: Uuid,
        actor: &Actor,
        investors: &[InvestorPosition],
    ) -> FundAdminResult<CallAllocationApplication> {
        let txn = self.load_expecting(id, ApprovalStatus::Approved)?;
        let fee_config = match &txn.detail {
            TransactionDetail::CapitalCall { fee_config } => fee_config.clone(),
            TransactionDetail::Distribution { .. } => {
                return Err(FundAdminError::InvalidInput {
                    field: "id".into(),
                    reason: format!("Transaction {id} is not a capital call"),
                });
            }
        };
        self.authorize(actor, &txn, "allocate")?;

        if !self.store.allocations(id)?.is_empty() {
            return Err(FundAdminError::AlreadyApplied {
                entity: "capital_call".into(),
                id: id.to_string(),
            });
        }

        let breakdown = allocate_call(&CallAllocationInput {
            call_total: txn.total,
            config: fee_config,
            investors: investors.to_vec(),
        })?;

        let allocations: Vec<Allocation> = breakdown
            .result
            .allocations
            .iter()
            .map(|a| {
                Allocation::new(
                    txn.id,
                    a.investor_id,
                    a.ownership_pct,
                    a.principal,
                    Some(a.fees.clone()),
                    a.amount_due,
                )
            })
            .collect();
        self.store.insert_allocations(allocations.clone())?;

        Ok(CallAllocationApplication {
            transaction: txn,
            breakdown,
            allocations,
        })
    }

    // -- internals ----------------------------------------------------------

    fn load_expecting(&self, id: Uuid, expected: ApprovalStatus) -> FundAdminResult<Transaction> {
        let txn = self.store.load(id)?;
        if txn.status != expected {
            return Err(FundAdminError::StateConflict {
                entity: format!("{} {}", txn.entity_kind(), id),
                expected: expected.to_string(),
                actual: txn.status.to_string(),
            });
        }
        Ok(txn)
    }

    fn load_in_review(&self, id: Uuid) -> FundAdminResult<Transaction> {
        let txn = self.store.load(id)?;
        match txn.status {
            ApprovalStatus::PendingReview | ApprovalStatus::PendingCfo => Ok(txn),
            other => Err(FundAdminError::StateConflict {
                entity: format!("{} {}", txn.entity_kind(), id),
                expected: "pending_review or pending_cfo".into(),
                actual: other.to_string(),
            }),
        }
    }

    /// Authorization runs before any mutation. Ownership is re-derived
    /// from the persisted record, never from caller-supplied fields.
    fn authorize(&self, actor: &Actor, txn: &Transaction, action: &str) -> FundAdminResult<()> {
        match actor.role {
            Role::Cfo => Ok(()),
            Role::Administrator => {
                if txn.status == ApprovalStatus::PendingCfo {
                    return Err(FundAdminError::Unauthorized {
                        role: Role::Administrator.to_string(),
                        action: format!("{action} at the CFO stage"),
                    });
                }
                if txn.created_by != actor.id {
                    return Err(FundAdminError::Unauthorized {
                        role: Role::Administrator.to_string(),
                        action: format!("{action} on a transaction created by another user"),
                    });
                }
                Ok(())
            }
        }
    }

    fn commit(
        &self,
        txn: Transaction,
        next: ApprovalStatus,
        action: ApprovalAction,
        actor: &Actor,
        note: Option<String>,
    ) -> FundAdminResult<TransitionOutcome> {
        let entry = ApprovalHistoryEntry::new(
            txn.entity_kind(),
            txn.id,
            action,
            txn.status,
            next,
            actor,
            note,
        );
        let updated = self
            .store
            .commit_transition(txn.id, txn.status, next, entry.clone())?;
        self.emit(&updated, &entry);
        Ok(TransitionOutcome {
            transaction: updated,
            audit_entry: entry,
        })
    }

    /// Fire-and-forget notification. A failure is logged and never fails
    /// the already-committed transition.
    fn emit(&self, txn: &Transaction, entry: &ApprovalHistoryEntry) {
        let event = TransitionEvent {
            entity: entry.entity,
            entity_id: entry.entity_id,
            action: entry.action,
            from_status: entry.from_status,
            to_status: entry.to_status,
            actor_id: entry.actor_id,
        };
        if let Err(err) = self.notifier.transition_occurred(&event) {
            tracing::warn!(
                entity_id = %txn.id,
                action = %entry.action,
                error = %err,
                "notification dispatch failed after committed transition"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::{FeeBasis, FeeConfig};
    use crate::workflow::memory::InMemoryStore;
    use crate::workflow::ports::NullNotifier;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn fee_config() -> FeeConfig {
        FeeConfig {
            rate: dec!(2),
            basis: FeeBasis::Committed,
            vat_rate: dec!(16),
            vat_applicable: true,
            period_label: None,
            dual_rate: None,
        }
    }

    fn admin() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: Role::Administrator,
        }
    }

    fn cfo() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: Role::Cfo,
        }
    }

    fn fund_context() -> FundContext {
        FundContext {
            fee_rate: dec!(2),
            hurdle_rate: dec!(0.08),
            carry_rate: dec!(0.20),
            catch_up_rate: dec!(1.0),
            gp_commitment_pct: dec!(0.02),
            base_currency: Currency::USD,
            total_commitment: dec!(1000000),
        }
    }

    fn new_call(store: &InMemoryStore, creator: &Actor) -> Uuid {
        let txn =
            Transaction::capital_call(Uuid::new_v4(), dec!(500000), fee_config(), creator.id);
        let id = txn.id;
        store.insert(txn).unwrap();
        id
    }

    #[test]
    fn test_happy_path_without_cfo() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        let out = sm.approve(id, &actor, false).unwrap();
        assert_eq!(out.transaction.status, ApprovalStatus::Approved);
        assert_eq!(out.audit_entry.action, ApprovalAction::Approved);
    }

    #[test]
    fn test_happy_path_with_cfo() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let chief = cfo();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        let out = sm.approve(id, &actor, true).unwrap();
        assert_eq!(out.transaction.status, ApprovalStatus::PendingCfo);
        assert_eq!(out.audit_entry.action, ApprovalAction::CfoSubmitted);

        let out = sm.cfo_approve(id, &chief).unwrap();
        assert_eq!(out.transaction.status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_submit_twice_fails_explicitly() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        let err = sm.submit_for_review(id, &actor).unwrap_err();
        assert!(matches!(err, FundAdminError::StateConflict { .. }));
    }

    #[test]
    fn test_admin_cannot_act_on_others_transaction() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let creator = admin();
        let other = admin();
        let id = new_call(&store, &creator);

        let err = sm.submit_for_review(id, &other).unwrap_err();
        assert!(matches!(err, FundAdminError::Unauthorized { .. }));
    }

    #[test]
    fn test_admin_cannot_act_at_cfo_stage() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        sm.approve(id, &actor, true).unwrap();

        for err in [
            sm.cfo_approve(id, &actor).unwrap_err(),
            sm.reject(id, &actor, "bad numbers").unwrap_err(),
            sm.request_changes(id, &actor, "fix the total").unwrap_err(),
        ] {
            assert!(matches!(err, FundAdminError::Unauthorized { .. }));
        }
    }

    #[test]
    fn test_reject_requires_reason() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        let err = sm.reject(id, &actor, "   ").unwrap_err();
        assert!(matches!(err, FundAdminError::InvalidInput { .. }));
    }

    #[test]
    fn test_request_changes_returns_to_draft() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        let out = sm.request_changes(id, &actor, "wrong fee rate").unwrap();
        assert_eq!(out.transaction.status, ApprovalStatus::Draft);

        // The cycle can run again
        sm.submit_for_review(id, &actor).unwrap();
    }

    #[test]
    fn test_transition_dispatcher() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.transition(id, &actor, TransitionRequest::SubmitForReview)
            .unwrap();
        let out = sm
            .transition(
                id,
                &actor,
                TransitionRequest::Reject {
                    reason: "duplicate call".into(),
                },
            )
            .unwrap();
        assert_eq!(out.transaction.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_apply_waterfall_requires_approved() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let chief = cfo();
        let txn = Transaction::distribution(Uuid::new_v4(), dec!(200), chief.id);
        let id = txn.id;
        store.insert(txn).unwrap();

        let request = WaterfallRequest {
            unreturned_capital: dec!(100),
            preferred_owed: dec!(8),
            management_fee_at_exit: None,
            investors: vec![InvestorStake {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(100),
            }],
        };
        let err = sm
            .apply_waterfall(id, &chief, &fund_context(), &request)
            .unwrap_err();
        assert!(matches!(err, FundAdminError::StateConflict { .. }));
    }

    #[test]
    fn test_apply_waterfall_once_only() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let chief = cfo();
        let txn = Transaction::distribution(Uuid::new_v4(), dec!(200), chief.id);
        let id = txn.id;
        store.insert(txn).unwrap();

        sm.submit_for_review(id, &chief).unwrap();
        sm.approve(id, &chief, false).unwrap();

        let request = WaterfallRequest {
            unreturned_capital: dec!(100),
            preferred_owed: dec!(8),
            management_fee_at_exit: None,
            investors: vec![InvestorStake {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(100),
            }],
        };
        let applied = sm
            .apply_waterfall(id, &chief, &fund_context(), &request)
            .unwrap();
        assert_eq!(applied.transaction.waterfall_applied(), Some(true));
        assert_eq!(applied.allocations.len(), 1);

        let before = store.allocations(id).unwrap();
        let err = sm
            .apply_waterfall(id, &chief, &fund_context(), &request)
            .unwrap_err();
        assert!(matches!(err, FundAdminError::AlreadyApplied { .. }));

        // First application's allocations are unchanged
        let after = store.allocations(id).unwrap();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].amount_due, after[0].amount_due);
    }

    #[test]
    fn test_allocate_capital_call_once() {
        use crate::fees::{InvestorPosition, InvestorTerms};

        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        sm.submit_for_review(id, &actor).unwrap();
        sm.approve(id, &actor, false).unwrap();

        let investors = vec![
            InvestorPosition {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(60),
                terms: InvestorTerms::default(),
            },
            InvestorPosition {
                investor_id: Uuid::new_v4(),
                ownership_pct: dec!(40),
                terms: InvestorTerms::default(),
            },
        ];
        let out = sm.allocate_capital_call(id, &actor, &investors).unwrap();
        assert_eq!(out.allocations.len(), 2);
        let principal_sum: Decimal = out.allocations.iter().map(|a| a.principal).sum();
        assert_eq!(principal_sum, dec!(500000));

        let err = sm
            .allocate_capital_call(id, &actor, &investors)
            .unwrap_err();
        assert!(matches!(err, FundAdminError::AlreadyApplied { .. }));
    }

    #[test]
    fn test_allocate_capital_call_requires_approved() {
        use crate::fees::{InvestorPosition, InvestorTerms};

        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        let investors = vec![InvestorPosition {
            investor_id: Uuid::new_v4(),
            ownership_pct: dec!(100),
            terms: InvestorTerms::default(),
        }];
        let err = sm
            .allocate_capital_call(id, &actor, &investors)
            .unwrap_err();
        assert!(matches!(err, FundAdminError::StateConflict { .. }));
    }

    #[test]
    fn test_apply_waterfall_rejects_capital_call() {
        let store = InMemoryStore::new();
        let notifier = NullNotifier;
        let sm = ApprovalStateMachine::new(&store, &notifier);
        let actor = admin();
        let id = new_call(&store, &actor);

        let request = WaterfallRequest {
            unreturned_capital: dec!(100),
            preferred_owed: Decimal::ZERO,
            management_fee_at_exit: None,
            investors: Vec::new(),
        };
        let err = sm
            .apply_waterfall(id, &actor, &fund_context(), &request)
            .unwrap_err();
        assert!(matches!(err, FundAdminError::InvalidInput { .. }));
    }
}
