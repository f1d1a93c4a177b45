//! Edit conflicts between pending contributions.
//!
//! # Examples
//!
//! ```
//! use tandem_core::models::conflict::{ConflictStatus, ResolutionStrategy};
//!
//! let status = ConflictStatus::Open;
//! assert!(status.is_open());
//! assert_eq!(ResolutionStrategy::AcceptLatest.as_str(), "accept_latest");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{ConflictId, ContributionId, EventId, UserId};

/// Why two contributions cannot both be approved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Two users edited the same field concurrently.
    SimultaneousEdit,
    /// The edits would leave the event in an inconsistent state
    /// (e.g. adding a participant someone else is removing).
    DataIntegrity,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::SimultaneousEdit => "simultaneous_edit",
            ConflictType::DataIntegrity => "data_integrity",
        }
    }
}

/// How a conflict is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    AcceptLatest,
    AcceptEarliest,
    MergeChanges,
    RejectAll,
    ManualResolution,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::AcceptLatest => "accept_latest",
            ResolutionStrategy::AcceptEarliest => "accept_earliest",
            ResolutionStrategy::MergeChanges => "merge_changes",
            ResolutionStrategy::RejectAll => "reject_all",
            ResolutionStrategy::ManualResolution => "manual_resolution",
        }
    }
}

/// Conflict status. The resolution only exists once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConflictStatus {
    Open,
    Resolved {
        strategy: ResolutionStrategy,
        resolved_by: UserId,
        resolved_at: DateTime<Utc>,
    },
}

impl ConflictStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ConflictStatus::Open)
    }

    pub fn strategy(&self) -> Option<ResolutionStrategy> {
        match self {
            ConflictStatus::Open => None,
            ConflictStatus::Resolved { strategy, .. } => Some(*strategy),
        }
    }
}

/// A detected incompatibility between contributions on the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditConflict {
    pub id: ConflictId,
    pub event_id: EventId,
    pub conflicting_contribution_ids: Vec<ContributionId>,
    /// Unique users behind the conflicting contributions.
    pub conflicting_user_ids: Vec<UserId>,
    pub conflict_type: ConflictType,
    pub status: ConflictStatus,
    pub detected_at: DateTime<Utc>,
}

impl EditConflict {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn references(&self, contribution_id: &ContributionId) -> bool {
        self.conflicting_contribution_ids.contains(contribution_id)
    }
}
