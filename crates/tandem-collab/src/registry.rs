//! SharedEventRegistry: shared events, their lifecycle, and id indexes.
//!
//! Each event owns an `Arc<Mutex<EventState>>` in a `DashMap`. Callers clone
//! the `Arc` out of the map before locking, so no map guard is ever held
//! while waiting on an event lock.
//!
//! Map order: `by_match` may be held while inserting into `events`, never
//! the reverse.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, instrument};

use tandem_core::constants::{EVENT_ID_PREFIX, VERSION_ID_PREFIX};
use tandem_core::models::{EventLifecycle, MutationRecord, SharedEvent, SharedEventMatch};
use tandem_core::{
    CollabError, ConflictId, ContributionId, EventId, MatchId, TandemResult, UserId,
};
use tandem_observability::events;

use crate::state::{lock, EventState, Services};
use crate::version_chain::VersionAuthor;

#[derive(Debug, Default)]
pub struct SharedEventRegistry {
    events: DashMap<EventId, Arc<Mutex<EventState>>>,
    by_match: DashMap<MatchId, EventId>,
    contributions: DashMap<ContributionId, EventId>,
    conflicts: DashMap<ConflictId, EventId>,
}

impl SharedEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    pub fn state(&self, event_id: &EventId) -> TandemResult<Arc<Mutex<EventState>>> {
        self.events
            .get(event_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CollabError::EventNotFound(event_id.to_string()).into())
    }

    pub fn event_for_contribution(&self, id: &ContributionId) -> TandemResult<EventId> {
        self.contributions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CollabError::ContributionNotFound(id.to_string()).into())
    }

    pub fn event_for_conflict(&self, id: &ConflictId) -> TandemResult<EventId> {
        self.conflicts
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CollabError::ConflictNotFound(id.to_string()).into())
    }

    pub fn event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.events.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn index_contribution(&self, id: ContributionId, event_id: EventId) {
        self.contributions.insert(id, event_id);
    }

    pub(crate) fn unindex_contribution(&self, id: &ContributionId) {
        self.contributions.remove(id);
    }

    pub(crate) fn index_conflict(&self, id: ConflictId, event_id: EventId) {
        self.conflicts.insert(id, event_id);
    }

    // ── Registration ────────────────────────────────────────────────────────

    /// Promote a detected match into an active shared event.
    ///
    /// Idempotent per match id. The owner is the reference event's owner,
    /// i.e. the first participant.
    #[instrument(skip(self, services, detected), fields(match_id = %detected.id))]
    pub fn accept_match(
        &self,
        services: &Services,
        detected: &SharedEventMatch,
        occurred_at: DateTime<Utc>,
        accepted_by: &UserId,
    ) -> TandemResult<SharedEvent> {
        if !detected.participant_ids.contains(accepted_by) {
            events::permission_denied(detected.id.as_str(), accepted_by.as_str(), "accept match");
            return Err(CollabError::PermissionDenied {
                user: accepted_by.to_string(),
                event: detected.id.to_string(),
                action: "accept match".to_string(),
            }
            .into());
        }

        let vacant = match self.by_match.entry(detected.id.clone()) {
            Entry::Occupied(existing) => {
                let event_id = existing.get().clone();
                drop(existing);
                let state = self.state(&event_id)?;
                let guard = lock(&state)?;
                return Ok(guard.event.clone());
            }
            Entry::Vacant(vacant) => vacant,
        };

        let mut participants: Vec<UserId> = Vec::with_capacity(detected.participant_ids.len());
        for p in &detected.participant_ids {
            if !participants.contains(p) {
                participants.push(p.clone());
            }
        }
        let now = services.now();
        let event = SharedEvent {
            id: services.next_id(EVENT_ID_PREFIX),
            owner_id: participants[0].clone(),
            participant_ids: participants,
            occurred_at,
            lifecycle: EventLifecycle::Active,
            original_event_id: None,
            source_match_id: Some(detected.id.clone()),
            created_at: now,
        };

        let mut state = EventState::new(event.clone());
        state.emit(
            &services.hub,
            now,
            vec![MutationRecord::SharedEventRecorded(event.clone())],
        );
        self.events
            .insert(event.id.clone(), Arc::new(Mutex::new(state)));
        vacant.insert(event.id.clone());

        events::shared_event_accepted(
            event.id.as_str(),
            detected.id.as_str(),
            event.participant_ids.len(),
        );
        Ok(event)
    }

    /// Register an externally created shared event. Returns the stored record,
    /// which is the existing one if the id is already known.
    pub fn register(&self, services: &Services, event: SharedEvent) -> TandemResult<SharedEvent> {
        let state = match self.events.entry(event.id.clone()) {
            Entry::Occupied(existing) => Some(Arc::clone(existing.get())),
            Entry::Vacant(vacant) => {
                let mut state = EventState::new(event.clone());
                state.emit(
                    &services.hub,
                    services.now(),
                    vec![MutationRecord::SharedEventRecorded(event.clone())],
                );
                vacant.insert(Arc::new(Mutex::new(state)));
                None
            }
        };
        let Some(state) = state else {
            // The `events` entry guard is released before touching `by_match`.
            if let Some(match_id) = &event.source_match_id {
                self.by_match
                    .entry(match_id.clone())
                    .or_insert_with(|| event.id.clone());
            }
            info!(event_id = %event.id, "shared event registered");
            return Ok(event);
        };
        let guard = lock(&state)?;
        Ok(guard.event.clone())
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Move an event to `to`. Only participants may drive transitions.
    #[instrument(skip(self, services))]
    pub fn transition(
        &self,
        services: &Services,
        event_id: &EventId,
        by: &UserId,
        to: EventLifecycle,
    ) -> TandemResult<SharedEvent> {
        let state = self.state(event_id)?;
        let mut guard = lock(&state)?;
        Self::check_participant(&guard.event, by, to.as_str())?;
        let from = guard.event.lifecycle;
        if !from.can_transition_to(to) {
            return Err(CollabError::InvalidLifecycleTransition {
                event: event_id.to_string(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            }
            .into());
        }
        guard.event.lifecycle = to;
        let event = guard.event.clone();
        guard.emit(
            &services.hub,
            services.now(),
            vec![MutationRecord::SharedEventRecorded(event.clone())],
        );
        events::shared_event_lifecycle_changed(event_id.as_str(), from.as_str(), to.as_str());
        Ok(event)
    }

    /// Split a subset of participants off into a new active event.
    ///
    /// The source becomes `bifurcated`. The new event records the source as
    /// its original and starts its own chain from the source's current data.
    #[instrument(skip(self, services))]
    pub fn bifurcate(
        &self,
        services: &Services,
        event_id: &EventId,
        participant_ids: &[UserId],
        by: &UserId,
    ) -> TandemResult<SharedEvent> {
        let source = self.state(event_id)?;
        let mut guard = lock(&source)?;
        Self::check_participant(&guard.event, by, "bifurcate")?;
        let from = guard.event.lifecycle;
        if !from.can_transition_to(EventLifecycle::Bifurcated) {
            return Err(CollabError::InvalidLifecycleTransition {
                event: event_id.to_string(),
                from: from.as_str().to_string(),
                to: EventLifecycle::Bifurcated.as_str().to_string(),
            }
            .into());
        }

        let mut participants: Vec<UserId> = Vec::new();
        for p in std::iter::once(by).chain(participant_ids) {
            Self::check_participant(&guard.event, p, "join bifurcated event")?;
            if !participants.contains(p) {
                participants.push(p.clone());
            }
        }

        let now = services.now();
        let branch = SharedEvent {
            id: services.next_id(EVENT_ID_PREFIX),
            participant_ids: participants.clone(),
            owner_id: by.clone(),
            occurred_at: guard.event.occurred_at,
            lifecycle: EventLifecycle::Active,
            original_event_id: Some(event_id.clone()),
            source_match_id: guard.event.source_match_id.clone(),
            created_at: now,
        };

        let mut branch_state = EventState::new(branch.clone());
        let mut branch_records = vec![MutationRecord::SharedEventRecorded(branch.clone())];
        if let Some(current) = guard.versions.current() {
            let mut data = current.event_data.clone();
            data.participant_ids = participants;
            let seeded = branch_state
                .versions
                .seed(
                    services.next_id(VERSION_ID_PREFIX),
                    branch.id.clone(),
                    data,
                    VersionAuthor {
                        user_id: by.clone(),
                        display_name: services.gate.display_name(by),
                        change_summary: format!("Bifurcated from {event_id}"),
                        created_at: now,
                    },
                )
                .clone();
            branch_records.push(MutationRecord::VersionCreated(seeded));
        }

        guard.event.lifecycle = EventLifecycle::Bifurcated;
        let source_event = guard.event.clone();
        guard.emit(
            &services.hub,
            now,
            vec![MutationRecord::SharedEventRecorded(source_event)],
        );
        branch_state.emit(&services.hub, now, branch_records);
        self.events
            .insert(branch.id.clone(), Arc::new(Mutex::new(branch_state)));
        drop(guard);

        events::shared_event_lifecycle_changed(event_id.as_str(), from.as_str(), "bifurcated");
        info!(source = %event_id, branch = %branch.id, "shared event bifurcated");
        Ok(branch)
    }

    fn check_participant(event: &SharedEvent, user: &UserId, action: &str) -> TandemResult<()> {
        if event.is_participant(user) {
            return Ok(());
        }
        events::permission_denied(event.id.as_str(), user.as_str(), action);
        Err(CollabError::PermissionDenied {
            user: user.to_string(),
            event: event.id.to_string(),
            action: action.to_string(),
        }
        .into())
    }
}
