//! Per-event state guarded by one mutex, and the services shared by every
//! component that mutates it.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use tandem_core::models::{
    ContentAttribution, EditConflict, MutationRecord, Notification, SharedEvent,
};
use tandem_core::traits::{Clock, FieldMergeFunction, IdGenerator};
use tandem_core::{CollabError, ConflictId, TandemError, TandemResult};

use crate::ledger::ContributionLedger;
use crate::notifications::NotificationHub;
use crate::permissions::PermissionGate;
use crate::version_chain::VersionChain;

/// Everything owned by one shared event.
#[derive(Debug)]
pub struct EventState {
    pub event: SharedEvent,
    pub ledger: ContributionLedger,
    pub versions: VersionChain,
    pub conflicts: Vec<EditConflict>,
    pub attribution: ContentAttribution,
    sequence: u64,
}

impl EventState {
    pub fn new(event: SharedEvent) -> Self {
        let attribution = ContentAttribution::new(event.id.clone());
        Self {
            event,
            ledger: ContributionLedger::new(),
            versions: VersionChain::new(),
            conflicts: Vec::new(),
            attribution,
            sequence: 0,
        }
    }

    pub fn ensure_active(&self) -> TandemResult<()> {
        if self.event.is_active() {
            Ok(())
        } else {
            Err(CollabError::EventNotActive {
                event: self.event.id.to_string(),
                state: self.event.lifecycle.as_str().to_string(),
            }
            .into())
        }
    }

    pub fn conflict(&self, id: &ConflictId) -> Option<&EditConflict> {
        self.conflicts.iter().find(|c| &c.id == id)
    }

    pub fn conflict_mut(&mut self, id: &ConflictId) -> Option<&mut EditConflict> {
        self.conflicts.iter_mut().find(|c| &c.id == id)
    }

    /// Open conflicts referencing a contribution, optionally ignoring one.
    pub fn open_conflicts_for(
        &self,
        contribution: &tandem_core::ContributionId,
        except: Option<&ConflictId>,
    ) -> Vec<ConflictId> {
        self.conflicts
            .iter()
            .filter(|c| c.is_open() && c.references(contribution))
            .filter(|c| except != Some(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Publish committed records in order, stamping per-event sequence numbers.
    ///
    /// Called while the state lock is held so same-event order equals
    /// commit order.
    pub fn emit(&mut self, hub: &NotificationHub, at: DateTime<Utc>, records: Vec<MutationRecord>) {
        for record in records {
            self.sequence += 1;
            hub.publish(Notification {
                event_id: self.event.id.clone(),
                sequence: self.sequence,
                recorded_at: at,
                record,
            });
        }
    }
}

pub(crate) fn lock(state: &Mutex<EventState>) -> TandemResult<MutexGuard<'_, EventState>> {
    state
        .lock()
        .map_err(|e| TandemError::ConcurrencyError(format!("event state lock poisoned: {e}")))
}

/// Collaborators shared by the registry, the session manager and the engine.
#[derive(Clone)]
pub struct Services {
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub merge: Option<Arc<dyn FieldMergeFunction>>,
    pub gate: PermissionGate,
    pub hub: NotificationHub,
}

impl Services {
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn next_id<T: From<String>>(&self, prefix: &str) -> T {
        T::from(self.ids.next_id(prefix))
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("gate", &self.gate)
            .field("has_merge", &self.merge.is_some())
            .finish_non_exhaustive()
    }
}
