//! Accepted shared events and their lifecycle.
//!
//! # Examples
//!
//! ```
//! use tandem_core::models::shared_event::EventLifecycle;
//!
//! assert!(EventLifecycle::Active.can_transition_to(EventLifecycle::Archived));
//! assert!(EventLifecycle::Archived.can_transition_to(EventLifecycle::Active));
//! assert!(!EventLifecycle::Deleted.can_transition_to(EventLifecycle::Active));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{EventId, MatchId, UserId};

/// Lifecycle state of a shared event. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventLifecycle {
    Active,
    Archived,
    /// Content withdrawn; the record remains as a tombstone.
    Redacted,
    /// Split into a derived event; see `SharedEvent::original_event_id`.
    Bifurcated,
    Deleted,
}

impl EventLifecycle {
    /// Allowed transitions:
    ///
    /// ```text
    /// active   -> archived | redacted | bifurcated | deleted
    /// archived -> active | deleted
    /// redacted -> deleted
    /// ```
    pub fn can_transition_to(self, next: EventLifecycle) -> bool {
        use EventLifecycle::*;
        matches!(
            (self, next),
            (Active, Archived)
                | (Active, Redacted)
                | (Active, Bifurcated)
                | (Active, Deleted)
                | (Archived, Active)
                | (Archived, Deleted)
                | (Redacted, Deleted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLifecycle::Active => "active",
            EventLifecycle::Archived => "archived",
            EventLifecycle::Redacted => "redacted",
            EventLifecycle::Bifurcated => "bifurcated",
            EventLifecycle::Deleted => "deleted",
        }
    }
}

/// The canonical collaborative record for an event shared between users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SharedEvent {
    pub id: EventId,
    pub participant_ids: Vec<UserId>,
    /// The user whose timeline anchored the event.
    pub owner_id: UserId,
    /// When the underlying real-world event happened.
    pub occurred_at: DateTime<Utc>,
    pub lifecycle: EventLifecycle,
    /// Set when this event was split off another one.
    pub original_event_id: Option<EventId>,
    /// The detection match this event was promoted from, if any.
    pub source_match_id: Option<MatchId>,
    pub created_at: DateTime<Utc>,
}

impl SharedEvent {
    pub fn is_active(&self) -> bool {
        self.lifecycle == EventLifecycle::Active
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participant_ids.contains(user)
    }
}
