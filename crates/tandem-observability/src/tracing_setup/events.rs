//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a completed detection run between two timelines.
pub fn shared_events_detected(user: &str, peer: &str, candidates: usize, kept: usize) {
    tracing::info!(
        event = "shared_events_detected",
        user = %user,
        peer = %peer,
        candidates = candidates,
        kept = kept,
        "shared-event detection completed"
    );
}

/// Log a match being promoted into a shared event.
pub fn shared_event_accepted(event_id: &str, match_id: &str, participants: usize) {
    tracing::info!(
        event = "shared_event_accepted",
        event_id = %event_id,
        match_id = %match_id,
        participants = participants,
        "shared event accepted"
    );
}

/// Log a lifecycle change on a shared event.
pub fn shared_event_lifecycle_changed(event_id: &str, from: &str, to: &str) {
    tracing::info!(
        event = "shared_event_lifecycle_changed",
        event_id = %event_id,
        from = %from,
        to = %to,
        "shared event lifecycle changed"
    );
}

/// Log a contribution entering the ledger.
pub fn contribution_submitted(
    event_id: &str,
    contribution_id: &str,
    contribution_type: &str,
    conflicts: usize,
) {
    tracing::info!(
        event = "contribution_submitted",
        event_id = %event_id,
        contribution_id = %contribution_id,
        contribution_type = %contribution_type,
        conflicts = conflicts,
        "contribution submitted"
    );
}

/// Log a newly recorded edit conflict.
pub fn conflict_detected(event_id: &str, conflict_id: &str, conflict_type: &str, members: usize) {
    tracing::warn!(
        event = "conflict_detected",
        event_id = %event_id,
        conflict_id = %conflict_id,
        conflict_type = %conflict_type,
        members = members,
        "edit conflict detected"
    );
}

/// Log a new current version.
pub fn version_created(event_id: &str, version_id: &str, version_number: u32) {
    tracing::info!(
        event = "version_created",
        event_id = %event_id,
        version_id = %version_id,
        version_number = version_number,
        "version created"
    );
}

/// Log a conflict resolution.
pub fn conflict_resolved(event_id: &str, conflict_id: &str, strategy: &str, resolved_by: &str) {
    tracing::info!(
        event = "conflict_resolved",
        event_id = %event_id,
        conflict_id = %conflict_id,
        strategy = %strategy,
        resolved_by = %resolved_by,
        "conflict resolved"
    );
}

/// Log a denied action.
pub fn permission_denied(event_id: &str, user: &str, action: &str) {
    tracing::warn!(
        event = "permission_denied",
        event_id = %event_id,
        user = %user,
        action = %action,
        "permission denied"
    );
}

/// Log a session start.
pub fn session_started(event_id: &str, session_id: &str, participants: usize) {
    tracing::info!(
        event = "session_started",
        event_id = %event_id,
        session_id = %session_id,
        participants = participants,
        "collaborative session started"
    );
}

/// Log a session end.
pub fn session_ended(event_id: &str, session_id: &str, reason: &str) {
    tracing::info!(
        event = "session_ended",
        event_id = %event_id,
        session_id = %session_id,
        reason = %reason,
        "collaborative session ended"
    );
}
