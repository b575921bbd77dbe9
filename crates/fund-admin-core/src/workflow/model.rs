use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::FundAdminError;
use crate::fees::{FeeBreakdown, FeeConfig};
use crate::types::*;
use crate::FundAdminResult;

// ---------------------------------------------------------------------------
// Approval lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of a transaction.
///
/// ```text
/// draft ──► pending_review ──► pending_cfo ──► approved
///               │    │             │   │
///               │    └► rejected ◄─┘   │
///               └──────► draft ◄───────┘   (changes requested)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    PendingReview,
    PendingCfo,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Whether a direct status edge exists in the state machine.
    pub fn can_transition_to(self, next: ApprovalStatus) -> bool {
        use ApprovalStatus::*;
        matches!(
            (self, next),
            (Draft, PendingReview)
                | (PendingReview, PendingCfo)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (PendingReview, Draft)
                | (PendingCfo, Approved)
                | (PendingCfo, Rejected)
                | (PendingCfo, Draft)
        )
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalStatus::Draft => "draft",
            ApprovalStatus::PendingReview => "pending_review",
            ApprovalStatus::PendingCfo => "pending_cfo",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Action recorded in the audit trail for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Submitted,
    Approved,
    CfoSubmitted,
    CfoApproved,
    Rejected,
    ChangesRequested,
    /// Status-preserving action on an approved distribution
    WaterfallApplied,
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalAction::Submitted => "submitted",
            ApprovalAction::Approved => "approved",
            ApprovalAction::CfoSubmitted => "cfo_submitted",
            ApprovalAction::CfoApproved => "cfo_approved",
            ApprovalAction::Rejected => "rejected",
            ApprovalAction::ChangesRequested => "changes_requested",
            ApprovalAction::WaterfallApplied => "waterfall_applied",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// Closed role set. Authorization checks match exhaustively so a new role
/// cannot silently fall through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May act only on transactions it created
    Administrator,
    /// Top-level role; may act on any transaction and is the only role
    /// permitted to act at the pending_cfo stage
    Cfo,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Administrator => "administrator",
            Role::Cfo => "cfo",
        };
        f.write_str(s)
    }
}

/// The acting user on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    CapitalCall,
    Distribution,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::CapitalCall => "capital_call",
            EntityKind::Distribution => "distribution",
        };
        f.write_str(s)
    }
}

/// Tier amounts written back to a distribution once its waterfall runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTiers {
    pub return_of_capital: Money,
    pub preferred_return: Money,
    pub gp_catch_up: Money,
    pub residual_split: Money,
    pub lp_total: Money,
    pub gp_total: Money,
}

/// Kind-specific payload of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionDetail {
    CapitalCall {
        fee_config: FeeConfig,
    },
    Distribution {
        waterfall_applied: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        tiers: Option<DistributionTiers>,
    },
}

/// A capital call or distribution moving through the approval lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Owning fund structure
    pub fund_id: Uuid,
    pub detail: TransactionDetail,
    pub total: Money,
    pub status: ApprovalStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn capital_call(
        fund_id: Uuid,
        total: Money,
        fee_config: FeeConfig,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            fund_id,
            detail: TransactionDetail::CapitalCall { fee_config },
            total,
            status: ApprovalStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn distribution(fund_id: Uuid, total: Money, created_by: Uuid) -> Self {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            fund_id,
            detail: TransactionDetail::Distribution {
                waterfall_applied: false,
                tiers: None,
            },
            total,
            status: ApprovalStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self.detail {
            TransactionDetail::CapitalCall { .. } => EntityKind::CapitalCall,
            TransactionDetail::Distribution { .. } => EntityKind::Distribution,
        }
    }

    /// Whether this distribution's waterfall has run. None for capital calls.
    pub fn waterfall_applied(&self) -> Option<bool> {
        match &self.detail {
            TransactionDetail::CapitalCall { .. } => None,
            TransactionDetail::Distribution {
                waterfall_applied, ..
            } => Some(*waterfall_applied),
        }
    }
}

// ---------------------------------------------------------------------------
// Allocations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

/// Per-investor share of a transaction. Created once per transaction,
/// mutated as payments are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub investor_id: Uuid,
    /// Ownership percentage (0-100) at the time of computation
    pub ownership_pct: Rate,
    pub principal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<FeeBreakdown>,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub status: AllocationStatus,
}

impl Allocation {
    pub fn new(
        transaction_id: Uuid,
        investor_id: Uuid,
        ownership_pct: Rate,
        principal: Money,
        fees: Option<FeeBreakdown>,
        amount_due: Money,
    ) -> Self {
        Allocation {
            id: Uuid::new_v4(),
            transaction_id,
            investor_id,
            ownership_pct,
            principal,
            fees,
            amount_due,
            amount_paid: Decimal::ZERO,
            status: AllocationStatus::Pending,
        }
    }

    /// Record a payment against this allocation. Overpayment is rejected.
    pub fn record_payment(&mut self, amount: Money) -> FundAdminResult<()> {
        if amount <= Decimal::ZERO {
            return Err(FundAdminError::InvalidInput {
                field: "amount".into(),
                reason: "Payment amount must be positive".into(),
            });
        }
        let paid = self.amount_paid + amount;
        if paid > self.amount_due {
            return Err(FundAdminError::InvalidInput {
                field: "amount".into(),
                reason: format!(
                    "Payment of {amount} would exceed amount due {} (already paid {})",
                    self.amount_due, self.amount_paid
                ),
            });
        }
        self.amount_paid = paid;
        self.status = if paid == self.amount_due {
            AllocationStatus::Paid
        } else {
            AllocationStatus::PartiallyPaid
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// Immutable record of one transition. Append-only; never updated or
/// deleted except as a cascade when the parent entity is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalHistoryEntry {
    pub id: Uuid,
    pub entity: EntityKind,
    pub entity_id: Uuid,
    pub action: ApprovalAction,
    pub from_status: ApprovalStatus,
    pub to_status: ApprovalStatus,
    pub actor_id: Uuid,
    pub actor_role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl ApprovalHistoryEntry {
    pub fn new(
        entity: EntityKind,
        entity_id: Uuid,
        action: ApprovalAction,
        from_status: ApprovalStatus,
        to_status: ApprovalStatus,
        actor: &Actor,
        note: Option<String>,
    ) -> Self {
        ApprovalHistoryEntry {
            id: Uuid::new_v4(),
            entity,
            entity_id,
            action,
            from_status,
            to_status,
            actor_id: actor.id,
            actor_role: actor.role,
            note,
            metadata: serde_json::Value::Null,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

// ---------------------------------------------------------------------------
// Fund context
// ---------------------------------------------------------------------------

/// Read-only fund snapshot consumed by the engines. Owned and mutated
/// elsewhere; taken here by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundContext {
    /// Management fee rate as a percentage
    pub fee_rate: Rate,
    /// Preferred-return hurdle as a decimal fraction
    pub hurdle_rate: Rate,
    /// GP carry as a decimal fraction
    pub carry_rate: Rate,
    /// GP share within the catch-up tier as a decimal fraction
    pub catch_up_rate: Rate,
    /// GP commitment as a decimal fraction of the fund
    pub gp_commitment_pct: Rate,
    pub base_currency: Currency,
    pub total_commitment: Money,
}
