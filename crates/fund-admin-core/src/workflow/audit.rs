use crate::error::FundAdminError;
use crate::workflow::model::{ApprovalAction, ApprovalHistoryEntry, ApprovalStatus};
use crate::FundAdminResult;

/// Replay audit entries in timestamp order and verify they form a legal
/// path through the state machine, starting from `draft`.
///
/// Returns the status sequence including the initial `draft`. Fails with a
/// state-conflict error when an entry's from-status does not match the
/// replayed status, or when an entry claims an edge the machine does not
/// have. Status-preserving entries (waterfall application) are legal only
/// when from and to statuses are equal.
pub fn replay_history(
    entries: &[ApprovalHistoryEntry],
) -> FundAdminResult<Vec<ApprovalStatus>> {
    let mut ordered: Vec<&ApprovalHistoryEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.recorded_at);

    let mut current = ApprovalStatus::Draft;
    let mut path = vec![current];

    for entry in ordered {
        if entry.from_status != current {
            return Err(FundAdminError::StateConflict {
                entity: format!("{} {}", entry.entity, entry.entity_id),
                expected: current.to_string(),
                actual: entry.from_status.to_string(),
            });
        }

        let legal = if entry.action == ApprovalAction::WaterfallApplied {
            entry.from_status == entry.to_status
        } else {
            current.can_transition_to(entry.to_status)
        };
        if !legal {
            return Err(FundAdminError::InvalidInput {
                field: "history".into(),
                reason: format!(
                    "Illegal transition {} -> {} recorded by action {}",
                    entry.from_status, entry.to_status, entry.action
                ),
            });
        }

        current = entry.to_status;
        path.push(current);
    }

    Ok(path)
}
