//! ContributionLedger: append-only store of proposed edits for one event.
//!
//! Entries keep submission order. The only mutations after append are the
//! one-shot approval transition and removal by a `reject_all` resolution.

use tandem_core::models::{Approval, Contribution};
use tandem_core::{CollabError, ContributionId, TandemResult};

#[derive(Debug, Clone, Default)]
pub struct ContributionLedger {
    entries: Vec<Contribution>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, contribution: Contribution) {
        self.entries.push(contribution);
    }

    pub fn get(&self, id: &ContributionId) -> Option<&Contribution> {
        self.entries.iter().find(|c| &c.id == id)
    }

    /// Submission order index, used for tie-breaking.
    pub fn position(&self, id: &ContributionId) -> Option<usize> {
        self.entries.iter().position(|c| &c.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Contribution> {
        self.entries.iter().filter(|c| c.is_pending())
    }

    pub fn all(&self) -> &[Contribution] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the approval. Fails if already approved.
    pub fn approve(&mut self, id: &ContributionId, approval: Approval) -> TandemResult<&Contribution> {
        let entry = self
            .entries
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| CollabError::ContributionNotFound(id.to_string()))?;
        if entry.is_approved() {
            return Err(CollabError::AlreadyApproved(id.to_string()).into());
        }
        entry.approval = Some(approval);
        Ok(entry)
    }

    /// Remove a pending contribution. Approved entries are never removed.
    pub fn remove_pending(&mut self, id: &ContributionId) -> Option<Contribution> {
        let index = self
            .entries
            .iter()
            .position(|c| &c.id == id && c.is_pending())?;
        Some(self.entries.remove(index))
    }
}
