use serde::{Deserialize, Serialize};

use super::defaults;

/// Who may approve a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    /// Anyone allowed to edit the event may approve any contribution.
    #[default]
    SameAsEdit,
    /// Only the shared event's owner may approve.
    OwnerOnly,
    /// Edit rights are required and contributors cannot approve their own work.
    OtherParticipant,
}

/// Collaboration engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollabConfig {
    pub approval_policy: ApprovalPolicy,
    /// Buffered notifications per subscriber before old ones are dropped.
    pub notification_capacity: usize,
    /// Sessions without activity for this long are ended by cleanup.
    pub session_idle_timeout_secs: u64,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            approval_policy: ApprovalPolicy::default(),
            notification_capacity: defaults::DEFAULT_NOTIFICATION_CAPACITY,
            session_idle_timeout_secs: defaults::DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
        }
    }
}
