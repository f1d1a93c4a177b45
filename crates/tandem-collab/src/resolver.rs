//! ConflictResolver: strategy selection and value merging.
//!
//! The engine drives the state changes; this module decides which pending
//! contribution wins and folds conflicting values through the merge
//! function.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tandem_core::models::{
    Contribution, EditConflict, EventVersion, ResolutionStrategy,
};
use tandem_core::traits::FieldMergeFunction;
use tandem_core::{CollabError, ContributionId, TandemError};

/// What a resolution changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub conflict: EditConflict,
    /// Auto-approved winner for `accept_latest` / `accept_earliest`.
    pub approved: Option<Contribution>,
    pub new_version: Option<EventVersion>,
    /// Contributions dropped from the ledger by `reject_all`.
    pub removed: Vec<ContributionId>,
    /// Field key → merged value for `merge_changes`, for the caller to submit
    /// as a follow-up contribution.
    pub merged: Option<BTreeMap<String, serde_json::Value>>,
}

impl ResolutionOutcome {
    pub fn resolved(conflict: EditConflict) -> Self {
        Self {
            conflict,
            approved: None,
            new_version: None,
            removed: Vec::new(),
            merged: None,
        }
    }
}

pub struct ConflictResolver;

impl ConflictResolver {
    /// Pick the winner among `(ledger position, contribution)` candidates.
    ///
    /// Latest: greatest timestamp, ties to the later ledger position.
    /// Earliest: smallest timestamp, ties to the earlier position. Other
    /// strategies have no winner.
    pub fn pick_winner<'a>(
        strategy: ResolutionStrategy,
        candidates: &[(usize, &'a Contribution)],
    ) -> Option<&'a Contribution> {
        let key = |(position, c): &&(usize, &'a Contribution)| (c.timestamp, *position);
        match strategy {
            ResolutionStrategy::AcceptLatest => candidates.iter().max_by_key(key).map(|(_, c)| *c),
            ResolutionStrategy::AcceptEarliest => {
                candidates.iter().min_by_key(key).map(|(_, c)| *c)
            }
            ResolutionStrategy::MergeChanges
            | ResolutionStrategy::RejectAll
            | ResolutionStrategy::ManualResolution => None,
        }
    }

    /// Fold each field's values in timestamp order through `merge`.
    ///
    /// Fields appear in the order they are first touched. A field touched by
    /// a single contribution passes through unmerged.
    pub fn merge_values(
        merge: &dyn FieldMergeFunction,
        contributions: &[Contribution],
    ) -> Result<BTreeMap<String, serde_json::Value>, CollabError> {
        let mut ordered: Vec<&Contribution> = contributions.iter().collect();
        // Stable: equal timestamps keep ledger order.
        ordered.sort_by_key(|c| c.timestamp);

        let mut merged: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        for contribution in ordered {
            let field = contribution.change.field_key();
            let value = contribution.change.field_value();
            let next = match merged.get(&field) {
                None => value,
                Some(acc) => merge
                    .merge(&field, acc, &value)
                    .map_err(|e| as_merge_failure(&field, e))?,
            };
            merged.insert(field, next);
        }
        Ok(merged)
    }
}

fn as_merge_failure(field: &str, error: TandemError) -> CollabError {
    match error {
        TandemError::Collab(failure @ CollabError::MergeFailed { .. }) => failure,
        other => CollabError::MergeFailed {
            field: field.to_string(),
            reason: other.to_string(),
        },
    }
}
