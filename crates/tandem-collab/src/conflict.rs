//! ConflictDetector: finds pending contributions incompatible with a new one.
//!
//! Two rules, checked against every pending contribution from other users:
//!
//! - **Integrity** (`DataIntegrity`): removing participant X against anything
//!   that supplies X, in either direction; two `privacyLevel` changes.
//! - **Same field** (`SimultaneousEdit`): identical change types, or the
//!   shared story bucket. Attribute and custom changes only collide on the
//!   same key.
//!
//! Integrity takes precedence when both rules match.

use tandem_core::constants::PRIVACY_LEVEL_ATTRIBUTE;
use tandem_core::models::{ConflictType, ContributionChange};
use tandem_core::{ContributionId, UserId};

use crate::ledger::ContributionLedger;

/// One conflict to record: its type and the existing contributions in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictCandidate {
    pub conflict_type: ConflictType,
    pub contribution_ids: Vec<ContributionId>,
    pub user_ids: Vec<UserId>,
}

pub struct ConflictDetector;

impl ConflictDetector {
    /// Scan the ledger's pending entries from users other than `contributor`.
    ///
    /// Returns at most one candidate per conflict type, simultaneous edits
    /// first. Member order follows the ledger.
    pub fn detect(
        ledger: &ContributionLedger,
        contributor: &UserId,
        change: &ContributionChange,
    ) -> Vec<ConflictCandidate> {
        let mut candidates: Vec<ConflictCandidate> = Vec::new();
        for existing in ledger.pending().filter(|c| &c.contributor_id != contributor) {
            let Some(conflict_type) = Self::classify(&existing.change, change) else {
                continue;
            };
            let index = match candidates
                .iter()
                .position(|c| c.conflict_type == conflict_type)
            {
                Some(index) => index,
                None => {
                    candidates.push(ConflictCandidate {
                        conflict_type,
                        contribution_ids: Vec::new(),
                        user_ids: Vec::new(),
                    });
                    candidates.len() - 1
                }
            };
            let candidate = &mut candidates[index];
            candidate.contribution_ids.push(existing.id.clone());
            if !candidate.user_ids.contains(&existing.contributor_id) {
                candidate.user_ids.push(existing.contributor_id.clone());
            }
        }
        candidates.sort_by_key(|c| c.conflict_type);
        candidates
    }

    /// Conflict type between two changes, if any.
    pub fn classify(
        existing: &ContributionChange,
        incoming: &ContributionChange,
    ) -> Option<ConflictType> {
        if Self::violates_integrity(existing, incoming) {
            Some(ConflictType::DataIntegrity)
        } else if Self::same_field(existing, incoming) {
            Some(ConflictType::SimultaneousEdit)
        } else {
            None
        }
    }

    pub fn same_field(a: &ContributionChange, b: &ContributionChange) -> bool {
        use ContributionChange::*;
        match (a, b) {
            (AttributeChange { attribute: x, .. }, AttributeChange { attribute: y, .. }) => x == y,
            (Custom { kind: x, .. }, Custom { kind: y, .. }) => x == y,
            _ => bucket(a).is_some() && bucket(a) == bucket(b),
        }
    }

    pub fn violates_integrity(a: &ContributionChange, b: &ContributionChange) -> bool {
        removes_supplied(a, b) || removes_supplied(b, a) || both_set_privacy(a, b)
    }
}

/// Semantic bucket for unkeyed change types.
fn bucket(change: &ContributionChange) -> Option<&'static str> {
    use ContributionChange::*;
    match change {
        TitleEdit { .. } => Some("title"),
        DescriptionEdit { .. } => Some("description"),
        StoryEdit { .. } | StoryAddition { .. } => Some("story"),
        LocationUpdate { .. } => Some("location"),
        ParticipantAdd { .. } => Some("participant_add"),
        ParticipantRemove { .. } => Some("participant_remove"),
        AttributeChange { .. } | Custom { .. } => None,
    }
}

fn removes_supplied(remove: &ContributionChange, other: &ContributionChange) -> bool {
    match remove {
        ContributionChange::ParticipantRemove { participant_id } => {
            other.supplied_participant().as_ref() == Some(participant_id)
        }
        _ => false,
    }
}

fn both_set_privacy(a: &ContributionChange, b: &ContributionChange) -> bool {
    a.attribute_key() == Some(PRIVACY_LEVEL_ATTRIBUTE)
        && b.attribute_key() == Some(PRIVACY_LEVEL_ATTRIBUTE)
}
