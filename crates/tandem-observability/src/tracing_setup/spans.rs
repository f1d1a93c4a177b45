//! Span definitions per operation: detection, submission, approval, resolution.

/// Create a detection span for one pair of timelines.
#[macro_export]
macro_rules! detection_span {
    ($user:expr, $peer:expr) => {
        tracing::info_span!("tandem.detection", user = %$user, peer = %$peer)
    };
}

/// Create a contribution submission span.
#[macro_export]
macro_rules! submission_span {
    ($event_id:expr, $contributor:expr) => {
        tracing::info_span!("tandem.submission", event_id = %$event_id, contributor = %$contributor)
    };
}

/// Create an approval span.
#[macro_export]
macro_rules! approval_span {
    ($contribution_id:expr, $approver:expr) => {
        tracing::info_span!(
            "tandem.approval",
            contribution_id = %$contribution_id,
            approver = %$approver
        )
    };
}

/// Create a conflict resolution span.
#[macro_export]
macro_rules! resolution_span {
    ($conflict_id:expr, $strategy:expr) => {
        tracing::info_span!("tandem.resolution", conflict_id = %$conflict_id, strategy = %$strategy)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const DETECTION: &str = "tandem.detection";
    pub const SUBMISSION: &str = "tandem.submission";
    pub const APPROVAL: &str = "tandem.approval";
    pub const RESOLUTION: &str = "tandem.resolution";
}
