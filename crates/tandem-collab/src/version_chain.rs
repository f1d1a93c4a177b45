//! VersionChain: linked history of approved snapshots for one event.
//!
//! Versions are numbered 1, 2, 3, ... without gaps. Every version except the
//! first points at its predecessor, and exactly one version is current.

use chrono::{DateTime, Utc};

use tandem_core::models::{ContributionChange, EventData, EventVersion};
use tandem_core::{EventId, UserId, VersionId};

#[derive(Debug, Clone, Default)]
pub struct VersionChain {
    versions: Vec<EventVersion>,
}

/// Who produced a new version, and why.
#[derive(Debug, Clone)]
pub struct VersionAuthor {
    pub user_id: UserId,
    pub display_name: String,
    pub change_summary: String,
    pub created_at: DateTime<Utc>,
}

impl VersionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&EventVersion> {
        self.versions.iter().rev().find(|v| v.is_current)
    }

    pub fn get(&self, id: &VersionId) -> Option<&EventVersion> {
        self.versions.iter().find(|v| &v.id == id)
    }

    pub fn all(&self) -> &[EventVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Start the chain with version 1. No-op returning the current version
    /// when the chain already has one.
    pub fn seed(
        &mut self,
        id: VersionId,
        event_id: EventId,
        event_data: EventData,
        author: VersionAuthor,
    ) -> &EventVersion {
        if self.versions.is_empty() {
            self.versions.push(EventVersion {
                id,
                event_id,
                version_number: 1,
                event_data,
                created_by: author.user_id,
                contributor_ids: Vec::new(),
                contributor_names: Vec::new(),
                parent_version_id: None,
                is_current: true,
                change_summary: author.change_summary,
                created_at: author.created_at,
            });
        }
        let last = self.versions.len() - 1;
        &self.versions[last]
    }

    /// Append the successor of the current version with `change` applied.
    ///
    /// Flips the predecessor's current flag and returns its id alongside the
    /// new version. `None` when the chain has not been seeded.
    pub fn advance(
        &mut self,
        id: VersionId,
        change: &ContributionChange,
        author: VersionAuthor,
    ) -> Option<(VersionId, &EventVersion)> {
        let index = self.versions.iter().rposition(|v| v.is_current)?;
        let previous = &mut self.versions[index];
        previous.is_current = false;

        let mut contributor_ids = previous.contributor_ids.clone();
        let mut contributor_names = previous.contributor_names.clone();
        if !contributor_ids.contains(&author.user_id) {
            contributor_ids.push(author.user_id.clone());
            contributor_names.push(author.display_name);
        }

        let next = EventVersion {
            id,
            event_id: previous.event_id.clone(),
            version_number: previous.version_number + 1,
            event_data: apply_change(&previous.event_data, change),
            created_by: author.user_id,
            contributor_ids,
            contributor_names,
            parent_version_id: Some(previous.id.clone()),
            is_current: true,
            change_summary: author.change_summary,
            created_at: author.created_at,
        };
        let superseded = previous.id.clone();
        self.versions.push(next);
        let last = self.versions.len() - 1;
        Some((superseded, &self.versions[last]))
    }

    /// Check the chain's structural invariants.
    pub fn is_consistent(&self) -> bool {
        if self.versions.is_empty() {
            return true;
        }
        let current = self.versions.iter().filter(|v| v.is_current).count();
        let numbered = self
            .versions
            .iter()
            .enumerate()
            .all(|(i, v)| v.version_number as usize == i + 1);
        let linked = self.versions.iter().all(|v| match &v.parent_version_id {
            None => v.version_number == 1,
            Some(parent) => self
                .get(parent)
                .is_some_and(|p| p.event_id == v.event_id && p.version_number + 1 == v.version_number),
        });
        current == 1 && numbered && linked
    }
}

/// Apply one change to a snapshot, producing the next snapshot.
pub fn apply_change(data: &EventData, change: &ContributionChange) -> EventData {
    let mut next = data.clone();
    match change {
        ContributionChange::TitleEdit { title } => next.title = Some(title.clone()),
        ContributionChange::DescriptionEdit { description } => {
            next.description = Some(description.clone())
        }
        ContributionChange::StoryEdit { text } => next.story = vec![text.clone()],
        ContributionChange::StoryAddition { text } => next.story.push(text.clone()),
        ContributionChange::LocationUpdate { location } => next.location = Some(location.clone()),
        ContributionChange::AttributeChange { attribute, value } => {
            next.attributes.insert(attribute.clone(), value.clone());
        }
        ContributionChange::ParticipantAdd { participant_id } => {
            if !next.participant_ids.contains(participant_id) {
                next.participant_ids.push(participant_id.clone());
            }
        }
        ContributionChange::ParticipantRemove { participant_id } => {
            next.participant_ids.retain(|p| p != participant_id);
        }
        ContributionChange::Custom { .. } => {
            next.attributes.insert(change.field_key(), change.field_value());
        }
    }
    next
}
