//! Collaborative presence sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{EventId, SessionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// Who is currently looking at or editing a shared event.
///
/// Presence only: sessions never gate submission or approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CollaborativeSession {
    pub id: SessionId,
    pub event_id: EventId,
    pub initiated_by: UserId,
    pub participant_ids: Vec<UserId>,
    /// Subset of participants currently editing.
    pub active_editor_ids: Vec<UserId>,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

impl CollaborativeSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
