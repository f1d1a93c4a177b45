//! Committed mutation records and the notifications that carry them.
//!
//! Every engine transaction publishes the records it committed. External
//! stores persist them; UIs use them to refresh views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::attribution::ContentAttribution;
use super::conflict::EditConflict;
use super::contribution::Contribution;
use super::ids::{ContributionId, EventId, VersionId};
use super::session::CollaborativeSession;
use super::shared_event::SharedEvent;
use super::version::EventVersion;

/// An append-only record of one committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "record", content = "data", rename_all = "snake_case")]
pub enum MutationRecord {
    SharedEventRecorded(SharedEvent),
    ContributionAppended(Contribution),
    ContributionApproved(Contribution),
    ContributionRemoved {
        contribution_id: ContributionId,
    },
    VersionCreated(EventVersion),
    VersionSuperseded {
        version_id: VersionId,
    },
    ConflictRecorded(EditConflict),
    ConflictResolved(EditConflict),
    AttributionUpdated(ContentAttribution),
    SessionStarted(CollaborativeSession),
    SessionUpdated(CollaborativeSession),
    SessionEnded(CollaborativeSession),
}

/// Coarse category of a record, for consumers that only follow one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    SharedEvent,
    Contribution,
    Version,
    Conflict,
    Attribution,
    Session,
}

impl MutationRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            MutationRecord::SharedEventRecorded(_) => RecordKind::SharedEvent,
            MutationRecord::ContributionAppended(_)
            | MutationRecord::ContributionApproved(_)
            | MutationRecord::ContributionRemoved { .. } => RecordKind::Contribution,
            MutationRecord::VersionCreated(_) | MutationRecord::VersionSuperseded { .. } => {
                RecordKind::Version
            }
            MutationRecord::ConflictRecorded(_) | MutationRecord::ConflictResolved(_) => {
                RecordKind::Conflict
            }
            MutationRecord::AttributionUpdated(_) => RecordKind::Attribution,
            MutationRecord::SessionStarted(_)
            | MutationRecord::SessionUpdated(_)
            | MutationRecord::SessionEnded(_) => RecordKind::Session,
        }
    }
}

/// A committed record, published after its transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub event_id: EventId,
    /// Per-event sequence number; gap-free and in commit order for one event.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub record: MutationRecord,
}
