//! CollaborationEngine: orchestrates registry, ledger, conflicts, versions,
//! attribution, sessions and notifications.
//!
//! Every mutation of one event runs inside that event's lock: submit,
//! conflict scan and append form one critical section; approval, version
//! flip and attribution update form another; a resolution runs within one.
//! Committed records are published before the lock is released.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument, warn};

use tandem_core::config::CollabConfig;
use tandem_core::constants::{
    BASELINE_CHANGE_SUMMARY, CONFLICT_ID_PREFIX, CONTRIBUTION_ID_PREFIX, VERSION_ID_PREFIX,
};
use tandem_core::models::{
    Approval, CollaborativeSession, ConflictStatus, ContentAttribution, Contribution,
    ContributionChange, EditConflict, EventData, EventLifecycle, EventVersion, MutationRecord,
    ResolutionStrategy, SharedEvent, SharedEventMatch,
};
use tandem_core::traits::{
    Clock, FieldMergeFunction, IdGenerator, RelationshipProvider, SystemClock, UuidGenerator,
};
use tandem_core::{
    CollabError, ConflictId, ContributionId, EventId, TandemError, TandemResult, UserId,
    VersionId,
};
use tandem_observability::events;

use crate::attribution::AttributionTracker;
use crate::conflict::ConflictDetector;
use crate::notifications::{EventStream, NotificationHub};
use crate::permissions::PermissionGate;
use crate::registry::SharedEventRegistry;
use crate::resolver::{ConflictResolver, ResolutionOutcome};
use crate::session::SessionManager;
use crate::state::{lock, EventState, Services};
use crate::version_chain::VersionAuthor;

/// The collaboration engine. Cheap to share behind an `Arc`; all methods
/// take `&self`.
#[derive(Debug)]
pub struct CollaborationEngine {
    config: CollabConfig,
    services: Services,
    registry: SharedEventRegistry,
    sessions: SessionManager,
}

/// Builder for [`CollaborationEngine`].
pub struct EngineBuilder {
    relationships: Arc<dyn RelationshipProvider>,
    config: CollabConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    merge: Option<Arc<dyn FieldMergeFunction>>,
}

impl EngineBuilder {
    pub fn config(mut self, config: CollabConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn merge_function(mut self, merge: Arc<dyn FieldMergeFunction>) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn build(self) -> CollaborationEngine {
        let services = Services {
            clock: self.clock,
            ids: self.ids,
            merge: self.merge,
            gate: PermissionGate::new(self.relationships, self.config.approval_policy),
            hub: NotificationHub::new(self.config.notification_capacity),
        };
        CollaborationEngine {
            config: self.config,
            services,
            registry: SharedEventRegistry::new(),
            sessions: SessionManager::new(),
        }
    }
}

impl CollaborationEngine {
    /// Engine with default config, system clock and uuid ids.
    pub fn new(relationships: Arc<dyn RelationshipProvider>) -> Self {
        Self::builder(relationships).build()
    }

    pub fn builder(relationships: Arc<dyn RelationshipProvider>) -> EngineBuilder {
        EngineBuilder {
            relationships,
            config: CollabConfig::default(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            merge: None,
        }
    }

    pub fn config(&self) -> &CollabConfig {
        &self.config
    }

    // ── Shared events ───────────────────────────────────────────────────────

    /// Promote a detected match into a shared event occurring at `occurred_at`.
    pub fn accept_match(
        &self,
        detected: &SharedEventMatch,
        occurred_at: DateTime<Utc>,
        accepted_by: &UserId,
    ) -> TandemResult<SharedEvent> {
        self.registry
            .accept_match(&self.services, detected, occurred_at, accepted_by)
    }

    pub fn register_shared_event(&self, event: SharedEvent) -> TandemResult<SharedEvent> {
        self.registry.register(&self.services, event)
    }

    pub fn archive(&self, event_id: &EventId, by: &UserId) -> TandemResult<SharedEvent> {
        let event = self
            .registry
            .transition(&self.services, event_id, by, EventLifecycle::Archived)?;
        self.close_presence(&event.id)?;
        Ok(event)
    }

    pub fn restore(&self, event_id: &EventId, by: &UserId) -> TandemResult<SharedEvent> {
        self.registry
            .transition(&self.services, event_id, by, EventLifecycle::Active)
    }

    pub fn redact(&self, event_id: &EventId, by: &UserId) -> TandemResult<SharedEvent> {
        let event = self
            .registry
            .transition(&self.services, event_id, by, EventLifecycle::Redacted)?;
        self.close_presence(&event.id)?;
        Ok(event)
    }

    pub fn delete(&self, event_id: &EventId, by: &UserId) -> TandemResult<SharedEvent> {
        let event = self
            .registry
            .transition(&self.services, event_id, by, EventLifecycle::Deleted)?;
        self.close_presence(&event.id)?;
        Ok(event)
    }

    /// Split `participant_ids` (plus `by`) off into a new event.
    pub fn bifurcate(
        &self,
        event_id: &EventId,
        participant_ids: &[UserId],
        by: &UserId,
    ) -> TandemResult<SharedEvent> {
        let branch = self
            .registry
            .bifurcate(&self.services, event_id, participant_ids, by)?;
        self.close_presence(event_id)?;
        Ok(branch)
    }

    // ── Contributions ───────────────────────────────────────────────────────

    /// Propose a change. Conflicts are recorded but never block submission.
    ///
    /// The first contribution on an event also synthesizes version 1 from
    /// the participant list.
    pub fn submit_contribution(
        &self,
        event_id: &EventId,
        contributor_id: &UserId,
        change: ContributionChange,
    ) -> TandemResult<Contribution> {
        let span = tandem_observability::submission_span!(event_id, contributor_id);
        let _entered = span.enter();

        let arc = self.registry.state(event_id)?;
        let mut guard = lock(&arc)?;
        let state = &mut *guard;
        state.ensure_active()?;
        if !self.services.gate.can_edit(&state.event, contributor_id) {
            return Err(denied(&state.event, contributor_id, "submit contribution"));
        }

        let now = self.services.now();
        let mut records = Vec::new();
        if state.versions.is_empty() {
            records.push(MutationRecord::VersionCreated(
                self.seed_baseline(state, contributor_id, now),
            ));
        }

        let contribution_id: ContributionId = self.services.next_id(CONTRIBUTION_ID_PREFIX);
        let conflicts: Vec<EditConflict> =
            ConflictDetector::detect(&state.ledger, contributor_id, &change)
                .into_iter()
                .map(|candidate| {
                    let mut contribution_ids = candidate.contribution_ids;
                    contribution_ids.push(contribution_id.clone());
                    let mut user_ids = candidate.user_ids;
                    if !user_ids.contains(contributor_id) {
                        user_ids.push(contributor_id.clone());
                    }
                    EditConflict {
                        id: self.services.next_id(CONFLICT_ID_PREFIX),
                        event_id: event_id.clone(),
                        conflicting_contribution_ids: contribution_ids,
                        conflicting_user_ids: user_ids,
                        conflict_type: candidate.conflict_type,
                        status: ConflictStatus::Open,
                        detected_at: now,
                    }
                })
                .collect();

        let contribution = Contribution {
            id: contribution_id,
            event_id: event_id.clone(),
            contributor_id: contributor_id.clone(),
            change,
            timestamp: now,
            previous_version_id: state.versions.current().map(|v| v.id.clone()),
            conflicts_with: conflicts.iter().map(|c| c.id.clone()).collect(),
            approval: None,
        };

        state.ledger.append(contribution.clone());
        self.registry
            .index_contribution(contribution.id.clone(), event_id.clone());
        records.push(MutationRecord::ContributionAppended(contribution.clone()));

        for conflict in &conflicts {
            self.registry
                .index_conflict(conflict.id.clone(), event_id.clone());
            records.push(MutationRecord::ConflictRecorded(conflict.clone()));
            events::conflict_detected(
                event_id.as_str(),
                conflict.id.as_str(),
                conflict.conflict_type.as_str(),
                conflict.conflicting_contribution_ids.len(),
            );
        }
        state.conflicts.extend(conflicts);
        state.emit(&self.services.hub, now, records);

        events::contribution_submitted(
            event_id.as_str(),
            contribution.id.as_str(),
            contribution.contribution_type().as_str(),
            contribution.conflicts_with.len(),
        );
        Ok(contribution)
    }

    /// Promote a pending contribution into the next version.
    pub fn approve_contribution(
        &self,
        contribution_id: &ContributionId,
        approved_by: &UserId,
    ) -> TandemResult<EventVersion> {
        let span = tandem_observability::approval_span!(contribution_id, approved_by);
        let _entered = span.enter();

        let event_id = self.registry.event_for_contribution(contribution_id)?;
        let arc = self.registry.state(&event_id)?;
        let mut guard = lock(&arc)?;
        let state = &mut *guard;

        let contribution = state
            .ledger
            .get(contribution_id)
            .cloned()
            .ok_or_else(|| CollabError::ContributionNotFound(contribution_id.to_string()))?;
        if contribution.is_approved() {
            return Err(CollabError::AlreadyApproved(contribution_id.to_string()).into());
        }
        state.ensure_active()?;
        if !self
            .services
            .gate
            .can_approve(&state.event, approved_by, Some(&contribution))
        {
            return Err(denied(&state.event, approved_by, "approve contribution"));
        }
        let blocking = state.open_conflicts_for(contribution_id, None);
        if !blocking.is_empty() {
            warn!(
                contribution_id = %contribution_id,
                conflicts = blocking.len(),
                "approval blocked by open conflict"
            );
            return Err(blocked(contribution_id, &blocking));
        }

        let now = self.services.now();
        let (_, version, records) = self.apply_approval(state, &contribution, approved_by, now)?;
        state.emit(&self.services.hub, now, records);
        Ok(version)
    }

    // ── Conflicts ───────────────────────────────────────────────────────────

    /// Resolve an open conflict with the given strategy.
    ///
    /// Nothing changes when the call fails. `merge_changes` runs the merge
    /// function outside the event lock and re-validates before committing.
    pub fn resolve_conflict(
        &self,
        conflict_id: &ConflictId,
        resolved_by: &UserId,
        strategy: ResolutionStrategy,
    ) -> TandemResult<ResolutionOutcome> {
        let span = tandem_observability::resolution_span!(conflict_id, strategy.as_str());
        let _entered = span.enter();

        let event_id = self.registry.event_for_conflict(conflict_id)?;
        let arc = self.registry.state(&event_id)?;

        let merged = match strategy {
            ResolutionStrategy::MergeChanges => {
                Some(self.merge_outside_lock(&arc, conflict_id, resolved_by)?)
            }
            _ => None,
        };

        let mut guard = lock(&arc)?;
        let state = &mut *guard;
        self.check_resolvable(state, conflict_id, resolved_by)?;
        let members = pending_members(state, conflict_id);
        let now = self.services.now();

        let mut records = Vec::new();
        let outcome = match strategy {
            ResolutionStrategy::AcceptLatest | ResolutionStrategy::AcceptEarliest => {
                let candidates: Vec<(usize, &Contribution)> =
                    members.iter().map(|(p, c)| (*p, c)).collect();
                let winner = ConflictResolver::pick_winner(strategy, &candidates).cloned();
                if let Some(winner) = &winner {
                    if !self
                        .services
                        .gate
                        .can_approve(&state.event, resolved_by, Some(winner))
                    {
                        return Err(denied(&state.event, resolved_by, "approve contribution"));
                    }
                    let blocking = state.open_conflicts_for(&winner.id, Some(conflict_id));
                    if !blocking.is_empty() {
                        return Err(blocked(&winner.id, &blocking));
                    }
                }

                let resolved = mark_resolved(state, conflict_id, strategy, resolved_by, now)?;
                records.push(MutationRecord::ConflictResolved(resolved.clone()));
                let mut outcome = ResolutionOutcome::resolved(resolved);
                if let Some(winner) = winner {
                    let (approved, version, more) =
                        self.apply_approval(state, &winner, resolved_by, now)?;
                    records.extend(more);
                    outcome.approved = Some(approved);
                    outcome.new_version = Some(version);
                }
                outcome
            }
            ResolutionStrategy::RejectAll => {
                let resolved = mark_resolved(state, conflict_id, strategy, resolved_by, now)?;
                records.push(MutationRecord::ConflictResolved(resolved.clone()));
                let mut outcome = ResolutionOutcome::resolved(resolved);
                for (_, contribution) in &members {
                    if state.ledger.remove_pending(&contribution.id).is_some() {
                        self.registry.unindex_contribution(&contribution.id);
                        records.push(MutationRecord::ContributionRemoved {
                            contribution_id: contribution.id.clone(),
                        });
                        outcome.removed.push(contribution.id.clone());
                    }
                }
                outcome
            }
            ResolutionStrategy::MergeChanges | ResolutionStrategy::ManualResolution => {
                if let Some(merged) = &merged {
                    debug!(members = members.len(), fields = merged.len(), "merge committed");
                }
                let resolved = mark_resolved(state, conflict_id, strategy, resolved_by, now)?;
                records.push(MutationRecord::ConflictResolved(resolved.clone()));
                let mut outcome = ResolutionOutcome::resolved(resolved);
                outcome.merged = merged;
                outcome
            }
        };

        state.emit(&self.services.hub, now, records);
        events::conflict_resolved(
            event_id.as_str(),
            conflict_id.as_str(),
            strategy.as_str(),
            resolved_by.as_str(),
        );
        Ok(outcome)
    }

    // ── Sessions ────────────────────────────────────────────────────────────

    /// Open a presence session. The initiator needs edit rights.
    #[instrument(skip(self))]
    pub fn start_session(
        &self,
        event_id: &EventId,
        participant_ids: &[UserId],
        initiated_by: &UserId,
    ) -> TandemResult<CollaborativeSession> {
        let arc = self.registry.state(event_id)?;
        let mut guard = lock(&arc)?;
        guard.ensure_active()?;
        if !self.services.gate.can_edit(&guard.event, initiated_by) {
            return Err(denied(&guard.event, initiated_by, "start session"));
        }
        if let Some(outsider) = participant_ids
            .iter()
            .find(|p| !guard.event.is_participant(p))
        {
            return Err(denied(&guard.event, outsider, "join session"));
        }

        let session = self
            .sessions
            .start(&self.services, event_id, participant_ids, initiated_by)?;
        guard.emit(
            &self.services.hub,
            session.started_at,
            vec![MutationRecord::SessionStarted(session.clone())],
        );
        events::session_started(
            event_id.as_str(),
            session.id.as_str(),
            session.participant_ids.len(),
        );
        Ok(session)
    }

    #[instrument(skip(self))]
    pub fn join_session(&self, event_id: &EventId, user: &UserId) -> TandemResult<CollaborativeSession> {
        self.presence(event_id, user, "join session", |sessions, at| {
            sessions.join(event_id, user, at)
        })
    }

    #[instrument(skip(self))]
    pub fn leave_session(&self, event_id: &EventId, user: &UserId) -> TandemResult<CollaborativeSession> {
        self.presence(event_id, user, "leave session", |sessions, at| {
            sessions.leave(event_id, user, at)
        })
    }

    #[instrument(skip(self))]
    pub fn mark_editing(&self, event_id: &EventId, user: &UserId) -> TandemResult<CollaborativeSession> {
        self.presence(event_id, user, "edit", |sessions, at| {
            sessions.mark_editing(event_id, user, at)
        })
    }

    #[instrument(skip(self))]
    pub fn stop_editing(&self, event_id: &EventId, user: &UserId) -> TandemResult<CollaborativeSession> {
        self.presence(event_id, user, "stop editing", |sessions, at| {
            sessions.stop_editing(event_id, user, at)
        })
    }

    #[instrument(skip(self))]
    pub fn end_session(&self, event_id: &EventId, by: &UserId) -> TandemResult<CollaborativeSession> {
        self.presence(event_id, by, "end session", |sessions, at| sessions.end(event_id, at))
    }

    /// End sessions idle for longer than the configured timeout.
    pub fn cleanup_idle_sessions(&self) -> TandemResult<Vec<CollaborativeSession>> {
        let secs = i64::try_from(self.config.session_idle_timeout_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1_000);
        self.cleanup_sessions_idle_for(Duration::seconds(secs))
    }

    /// End sessions idle for longer than `max_idle`.
    pub fn cleanup_sessions_idle_for(
        &self,
        max_idle: Duration,
    ) -> TandemResult<Vec<CollaborativeSession>> {
        let now = self.services.now();
        let mut ended = Vec::new();
        for event_id in self.sessions.idle_events(now, max_idle) {
            let Ok(arc) = self.registry.state(&event_id) else {
                continue;
            };
            let mut guard = lock(&arc)?;
            if let Some(session) = self.sessions.end_if_idle(&event_id, now, max_idle) {
                guard.emit(
                    &self.services.hub,
                    now,
                    vec![MutationRecord::SessionEnded(session.clone())],
                );
                events::session_ended(event_id.as_str(), session.id.as_str(), "idle");
                ended.push(session);
            }
        }
        Ok(ended)
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn shared_event(&self, event_id: &EventId) -> TandemResult<SharedEvent> {
        self.read(event_id, |s| s.event.clone())
    }

    pub fn shared_event_ids(&self) -> Vec<EventId> {
        self.registry.event_ids()
    }

    /// Ledger entries in submission order.
    pub fn contributions_for(&self, event_id: &EventId) -> TandemResult<Vec<Contribution>> {
        self.read(event_id, |s| s.ledger.all().to_vec())
    }

    /// Version history, oldest first.
    pub fn versions_for(&self, event_id: &EventId) -> TandemResult<Vec<EventVersion>> {
        self.read(event_id, |s| s.versions.all().to_vec())
    }

    pub fn current_version(&self, event_id: &EventId) -> TandemResult<Option<EventVersion>> {
        self.read(event_id, |s| s.versions.current().cloned())
    }

    pub fn conflicts_for(&self, event_id: &EventId) -> TandemResult<Vec<EditConflict>> {
        self.read(event_id, |s| s.conflicts.clone())
    }

    pub fn attribution_for(&self, event_id: &EventId) -> TandemResult<ContentAttribution> {
        self.read(event_id, |s| s.attribution.clone())
    }

    pub fn contribution(&self, id: &ContributionId) -> TandemResult<Contribution> {
        let event_id = self.registry.event_for_contribution(id)?;
        self.read(&event_id, |s| s.ledger.get(id).cloned())?
            .ok_or_else(|| CollabError::ContributionNotFound(id.to_string()).into())
    }

    pub fn conflict(&self, id: &ConflictId) -> TandemResult<EditConflict> {
        let event_id = self.registry.event_for_conflict(id)?;
        self.read(&event_id, |s| s.conflict(id).cloned())?
            .ok_or_else(|| CollabError::ConflictNotFound(id.to_string()).into())
    }

    pub fn active_session(&self, event_id: &EventId) -> Option<CollaborativeSession> {
        self.sessions.active(event_id)
    }

    // ── Notifications ───────────────────────────────────────────────────────

    pub fn subscribe(&self) -> EventStream {
        self.services.hub.subscribe()
    }

    pub fn subscribe_event(&self, event_id: &EventId) -> EventStream {
        self.services.hub.subscribe_event(event_id.clone())
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn read<T>(&self, event_id: &EventId, f: impl FnOnce(&EventState) -> T) -> TandemResult<T> {
        let arc = self.registry.state(event_id)?;
        let guard = lock(&arc)?;
        Ok(f(&guard))
    }

    fn seed_baseline(
        &self,
        state: &mut EventState,
        contributor_id: &UserId,
        now: DateTime<Utc>,
    ) -> EventVersion {
        let data = EventData::seed(state.event.participant_ids.clone());
        state
            .versions
            .seed(
                self.services.next_id(VERSION_ID_PREFIX),
                state.event.id.clone(),
                data,
                VersionAuthor {
                    user_id: contributor_id.clone(),
                    display_name: self.services.gate.display_name(contributor_id),
                    change_summary: BASELINE_CHANGE_SUMMARY.to_string(),
                    created_at: now,
                },
            )
            .clone()
    }

    /// Approve, advance the chain, credit the contributor. Callers have
    /// already checked rights and conflicts.
    fn apply_approval(
        &self,
        state: &mut EventState,
        contribution: &Contribution,
        approved_by: &UserId,
        now: DateTime<Utc>,
    ) -> TandemResult<(Contribution, EventVersion, Vec<MutationRecord>)> {
        let mut records = Vec::new();
        if state.versions.is_empty() {
            records.push(MutationRecord::VersionCreated(self.seed_baseline(
                state,
                &contribution.contributor_id,
                now,
            )));
        }

        let version_id: VersionId = self.services.next_id(VERSION_ID_PREFIX);
        let approved = state
            .ledger
            .approve(
                &contribution.id,
                Approval {
                    approved_by: approved_by.clone(),
                    approved_at: now,
                    new_version_id: version_id.clone(),
                },
            )?
            .clone();

        let author = VersionAuthor {
            user_id: contribution.contributor_id.clone(),
            display_name: self.services.gate.display_name(&contribution.contributor_id),
            change_summary: contribution.change.summary(),
            created_at: now,
        };
        let (superseded, version) = state
            .versions
            .advance(version_id, &contribution.change, author)
            .map(|(superseded, version)| (superseded, version.clone()))
            .ok_or_else(|| {
                TandemError::ConcurrencyError(format!(
                    "event {} has no current version",
                    state.event.id
                ))
            })?;

        AttributionTracker::record(&mut state.attribution, &approved);

        records.push(MutationRecord::VersionSuperseded {
            version_id: superseded,
        });
        records.push(MutationRecord::VersionCreated(version.clone()));
        records.push(MutationRecord::ContributionApproved(approved.clone()));
        records.push(MutationRecord::AttributionUpdated(state.attribution.clone()));

        if version.event_data.participant_ids != state.event.participant_ids {
            state.event.participant_ids = version.event_data.participant_ids.clone();
            records.push(MutationRecord::SharedEventRecorded(state.event.clone()));
        }

        events::version_created(
            state.event.id.as_str(),
            version.id.as_str(),
            version.version_number,
        );
        Ok((approved, version, records))
    }

    /// Exists, open, event active, resolver holds approval rights.
    fn check_resolvable(
        &self,
        state: &EventState,
        conflict_id: &ConflictId,
        resolved_by: &UserId,
    ) -> TandemResult<()> {
        let conflict = state
            .conflict(conflict_id)
            .ok_or_else(|| CollabError::ConflictNotFound(conflict_id.to_string()))?;
        if !conflict.is_open() {
            return Err(CollabError::ConflictAlreadyResolved(conflict_id.to_string()).into());
        }
        state.ensure_active()?;
        if !self.services.gate.can_approve(&state.event, resolved_by, None) {
            return Err(denied(&state.event, resolved_by, "resolve conflict"));
        }
        Ok(())
    }

    /// Snapshot the conflict's pending contributions, merge without holding
    /// the lock, then confirm the snapshot still matches.
    fn merge_outside_lock(
        &self,
        arc: &Mutex<EventState>,
        conflict_id: &ConflictId,
        resolved_by: &UserId,
    ) -> TandemResult<BTreeMap<String, serde_json::Value>> {
        let snapshot: Vec<Contribution> = {
            let guard = lock(arc)?;
            self.check_resolvable(&guard, conflict_id, resolved_by)?;
            pending_members(&guard, conflict_id)
                .into_iter()
                .map(|(_, c)| c)
                .collect()
        };

        let Some(merge) = self.services.merge.clone() else {
            let field = snapshot
                .first()
                .map(|c| c.change.field_key())
                .unwrap_or_default();
            warn!(conflict_id = %conflict_id, "no merge function configured");
            return Err(CollabError::MergeFailed {
                field,
                reason: "no merge function configured".to_string(),
            }
            .into());
        };

        let merged = ConflictResolver::merge_values(merge.as_ref(), &snapshot).map_err(|e| {
            warn!(conflict_id = %conflict_id, error = %e, "merge failed, conflict stays open");
            TandemError::from(e)
        })?;

        let guard = lock(arc)?;
        let still_pending = snapshot
            .iter()
            .all(|c| guard.ledger.get(&c.id).is_some_and(Contribution::is_pending));
        if !still_pending {
            return Err(CollabError::MergeFailed {
                field: merged.keys().next().cloned().unwrap_or_default(),
                reason: "conflicting contributions changed during merge".to_string(),
            }
            .into());
        }
        Ok(merged)
    }

    /// End the active session of an event that has left the active state.
    fn close_presence(&self, event_id: &EventId) -> TandemResult<()> {
        let arc = self.registry.state(event_id)?;
        let mut guard = lock(&arc)?;
        if guard.event.is_active() {
            return Ok(());
        }
        let now = self.services.now();
        if let Some(session) = self.sessions.end_active(event_id, now) {
            events::session_ended(
                event_id.as_str(),
                session.id.as_str(),
                guard.event.lifecycle.as_str(),
            );
            guard.emit(&self.services.hub, now, vec![MutationRecord::SessionEnded(session)]);
        }
        Ok(())
    }

    fn presence<F>(
        &self,
        event_id: &EventId,
        user: &UserId,
        action: &str,
        f: F,
    ) -> TandemResult<CollaborativeSession>
    where
        F: FnOnce(&SessionManager, DateTime<Utc>) -> TandemResult<CollaborativeSession>,
    {
        let arc = self.registry.state(event_id)?;
        let mut guard = lock(&arc)?;
        guard.ensure_active()?;
        if !guard.event.is_participant(user) {
            return Err(denied(&guard.event, user, action));
        }
        let now = self.services.now();
        let session = f(&self.sessions, now)?;
        let record = if session.is_active() {
            MutationRecord::SessionUpdated(session.clone())
        } else {
            events::session_ended(event_id.as_str(), session.id.as_str(), action);
            MutationRecord::SessionEnded(session.clone())
        };
        guard.emit(&self.services.hub, now, vec![record]);
        Ok(session)
    }
}

/// Pending members of a conflict with their ledger positions.
fn pending_members(state: &EventState, conflict_id: &ConflictId) -> Vec<(usize, Contribution)> {
    let Some(conflict) = state.conflict(conflict_id) else {
        return Vec::new();
    };
    conflict
        .conflicting_contribution_ids
        .iter()
        .filter_map(|id| {
            let position = state.ledger.position(id)?;
            let contribution = state.ledger.get(id)?;
            contribution
                .is_pending()
                .then(|| (position, contribution.clone()))
        })
        .collect()
}

fn mark_resolved(
    state: &mut EventState,
    conflict_id: &ConflictId,
    strategy: ResolutionStrategy,
    resolved_by: &UserId,
    at: DateTime<Utc>,
) -> TandemResult<EditConflict> {
    let conflict = state
        .conflict_mut(conflict_id)
        .ok_or_else(|| CollabError::ConflictNotFound(conflict_id.to_string()))?;
    conflict.status = ConflictStatus::Resolved {
        strategy,
        resolved_by: resolved_by.clone(),
        resolved_at: at,
    };
    Ok(conflict.clone())
}

fn denied(event: &SharedEvent, user: &UserId, action: &str) -> TandemError {
    events::permission_denied(event.id.as_str(), user.as_str(), action);
    CollabError::PermissionDenied {
        user: user.to_string(),
        event: event.id.to_string(),
        action: action.to_string(),
    }
    .into()
}

fn blocked(contribution_id: &ContributionId, conflicts: &[ConflictId]) -> TandemError {
    CollabError::BlockedByConflict {
        contribution: contribution_id.to_string(),
        conflicts: conflicts.iter().map(ToString::to_string).collect(),
    }
    .into()
}
