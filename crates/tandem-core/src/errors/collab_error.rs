//! Error types for collaborative editing of shared events.

/// Errors raised by the contribution/version/conflict engine.
///
/// All of these are local and recoverable; none leave partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// The actor lacks edit/approval rights, or the relationship is inactive.
    #[error("permission denied: user {user} cannot {action} on event {event}")]
    PermissionDenied {
        /// The user that was denied.
        user: String,
        /// The event being accessed.
        event: String,
        /// What the user tried to do.
        action: String,
    },

    #[error("a collaborative session is already active for event {event}")]
    SessionAlreadyActive { event: String },

    #[error("no active collaborative session for event {event}")]
    SessionNotFound { event: String },

    #[error("contribution not found: {0}")]
    ContributionNotFound(String),

    #[error("conflict not found: {0}")]
    ConflictNotFound(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("event {event} is {state}, not active")]
    EventNotActive { event: String, state: String },

    #[error("event {event} cannot move from {from} to {to}")]
    InvalidLifecycleTransition {
        event: String,
        from: String,
        to: String,
    },

    #[error("contribution {0} is already approved")]
    AlreadyApproved(String),

    #[error("conflict {0} is already resolved")]
    ConflictAlreadyResolved(String),

    /// The contribution is referenced by at least one open conflict.
    #[error("contribution {contribution} is blocked by open conflicts: {conflicts:?}")]
    BlockedByConflict {
        contribution: String,
        conflicts: Vec<String>,
    },

    /// The external merge delegate could not reconcile the values.
    #[error("merge failed for field {field}: {reason}")]
    MergeFailed { field: String, reason: String },
}
