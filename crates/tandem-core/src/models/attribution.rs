//! Per-event contributor credit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::contribution::ContributionType;
use super::ids::{EventId, UserId};

/// Credit held by one contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContributorCredit {
    pub user_id: UserId,
    /// Distinct kinds of contribution, in first-seen order.
    pub contribution_types: Vec<ContributionType>,
    pub count: u32,
    pub first_contributed_at: DateTime<Utc>,
    pub last_contributed_at: DateTime<Utc>,
    pub is_primary_contributor: bool,
}

/// Contributor ledger for one piece of content (a shared event).
///
/// Invariant: the sum of every contributor's `count` equals
/// `total_contributions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContentAttribution {
    pub content_id: EventId,
    pub contributors: Vec<ContributorCredit>,
    pub total_contributions: u32,
}

impl ContentAttribution {
    pub fn new(content_id: EventId) -> Self {
        Self {
            content_id,
            contributors: Vec::new(),
            total_contributions: 0,
        }
    }

    pub fn contributor(&self, user_id: &UserId) -> Option<&ContributorCredit> {
        self.contributors.iter().find(|c| &c.user_id == user_id)
    }

    pub fn primary_contributor(&self) -> Option<&ContributorCredit> {
        self.contributors.iter().find(|c| c.is_primary_contributor)
    }
}
