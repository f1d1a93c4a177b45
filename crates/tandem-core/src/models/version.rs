//! Approved, immutable snapshots of a shared event.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::contribution::EventLocation;
use super::ids::{EventId, UserId, VersionId};

/// The collaborative payload of a shared event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventData {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Story text, one entry per segment.
    pub story: Vec<String>,
    pub location: Option<EventLocation>,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub participant_ids: Vec<UserId>,
}

impl EventData {
    /// Minimal seed record used when the first write creates the baseline.
    pub fn seed(participant_ids: Vec<UserId>) -> Self {
        Self {
            participant_ids,
            ..Self::default()
        }
    }
}

/// One link of an event's version chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventVersion {
    pub id: VersionId,
    pub event_id: EventId,
    /// Starts at 1 and increases by exactly one per approval.
    pub version_number: u32,
    pub event_data: EventData,
    pub created_by: UserId,
    /// Everyone who has shaped this lineage, in first-contribution order.
    pub contributor_ids: Vec<UserId>,
    pub contributor_names: Vec<String>,
    /// `None` only for version 1.
    pub parent_version_id: Option<VersionId>,
    pub is_current: bool,
    pub change_summary: String,
    pub created_at: DateTime<Utc>,
}
