//! SessionManager: advisory presence per shared event via `DashMap`.
//!
//! At most one active session exists per event; the map's entry API makes
//! the check-and-insert atomic. Presence never gates contributions.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use tandem_core::constants::SESSION_ID_PREFIX;
use tandem_core::models::{CollaborativeSession, SessionStatus};
use tandem_core::{CollabError, EventId, TandemResult, UserId};

use crate::state::Services;

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<EventId, CollaborativeSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session. Fails if one is already active for the event.
    pub fn start(
        &self,
        services: &Services,
        event_id: &EventId,
        participant_ids: &[UserId],
        initiated_by: &UserId,
    ) -> TandemResult<CollaborativeSession> {
        let now = services.now();
        let mut participants = vec![initiated_by.clone()];
        for p in participant_ids {
            if !participants.contains(p) {
                participants.push(p.clone());
            }
        }
        let session = CollaborativeSession {
            id: services.next_id(SESSION_ID_PREFIX),
            event_id: event_id.clone(),
            initiated_by: initiated_by.clone(),
            participant_ids: participants,
            active_editor_ids: Vec::new(),
            started_at: now,
            last_activity_at: now,
            ended_at: None,
            status: SessionStatus::Active,
        };

        match self.sessions.entry(event_id.clone()) {
            Entry::Occupied(existing) if existing.get().is_active() => {
                Err(CollabError::SessionAlreadyActive {
                    event: event_id.to_string(),
                }
                .into())
            }
            Entry::Occupied(mut ended) => {
                ended.insert(session.clone());
                Ok(session)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(session.clone());
                Ok(session)
            }
        }
    }

    /// Apply `f` to the active session and return the updated snapshot.
    pub fn update<F>(&self, event_id: &EventId, at: DateTime<Utc>, f: F) -> TandemResult<CollaborativeSession>
    where
        F: FnOnce(&mut CollaborativeSession),
    {
        let mut entry = self
            .sessions
            .get_mut(event_id)
            .filter(|s| s.is_active())
            .ok_or_else(|| CollabError::SessionNotFound {
                event: event_id.to_string(),
            })?;
        f(&mut *entry);
        entry.last_activity_at = at;
        if entry.participant_ids.is_empty() {
            Self::close(&mut *entry, at);
        }
        Ok(entry.clone())
    }

    pub fn join(&self, event_id: &EventId, user: &UserId, at: DateTime<Utc>) -> TandemResult<CollaborativeSession> {
        self.update(event_id, at, |s| {
            if !s.participant_ids.contains(user) {
                s.participant_ids.push(user.clone());
            }
        })
    }

    /// Leaving also stops editing. The last one out ends the session.
    pub fn leave(&self, event_id: &EventId, user: &UserId, at: DateTime<Utc>) -> TandemResult<CollaborativeSession> {
        self.update(event_id, at, |s| {
            s.participant_ids.retain(|p| p != user);
            s.active_editor_ids.retain(|p| p != user);
        })
    }

    /// Marking as editing joins the session if needed.
    pub fn mark_editing(&self, event_id: &EventId, user: &UserId, at: DateTime<Utc>) -> TandemResult<CollaborativeSession> {
        self.update(event_id, at, |s| {
            if !s.participant_ids.contains(user) {
                s.participant_ids.push(user.clone());
            }
            if !s.active_editor_ids.contains(user) {
                s.active_editor_ids.push(user.clone());
            }
        })
    }

    pub fn stop_editing(&self, event_id: &EventId, user: &UserId, at: DateTime<Utc>) -> TandemResult<CollaborativeSession> {
        self.update(event_id, at, |s| s.active_editor_ids.retain(|p| p != user))
    }

    pub fn end(&self, event_id: &EventId, at: DateTime<Utc>) -> TandemResult<CollaborativeSession> {
        self.update(event_id, at, |s| Self::close(s, at))
    }

    pub fn active(&self, event_id: &EventId) -> Option<CollaborativeSession> {
        self.sessions
            .get(event_id)
            .filter(|s| s.is_active())
            .map(|s| s.clone())
    }

    /// Events whose active session has been idle for longer than `max_idle`.
    pub fn idle_events(&self, now: DateTime<Utc>, max_idle: Duration) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self
            .sessions
            .iter()
            .filter(|s| s.is_active() && now - s.last_activity_at > max_idle)
            .map(|s| s.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// End the event's session if one is active. `None` when there is none.
    pub fn end_active(&self, event_id: &EventId, at: DateTime<Utc>) -> Option<CollaborativeSession> {
        let mut entry = self.sessions.get_mut(event_id)?;
        if !entry.is_active() {
            return None;
        }
        Self::close(&mut *entry, at);
        Some(entry.clone())
    }

    /// End the event's session if it is still idle. `None` when it is not.
    pub fn end_if_idle(
        &self,
        event_id: &EventId,
        now: DateTime<Utc>,
        max_idle: Duration,
    ) -> Option<CollaborativeSession> {
        let mut entry = self.sessions.get_mut(event_id)?;
        if !entry.is_active() || now - entry.last_activity_at <= max_idle {
            return None;
        }
        Self::close(&mut *entry, now);
        Some(entry.clone())
    }

    pub fn active_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_active()).count()
    }

    fn close(session: &mut CollaborativeSession, at: DateTime<Utc>) {
        session.status = SessionStatus::Ended;
        session.ended_at = Some(at);
        session.active_editor_ids.clear();
    }
}
