//! Tracing setup, span macros, and structured event helpers.

use tandem_core::config::ObservabilityConfig;
use tandem_observability::events;
use tandem_observability::tracing_setup::spans::names;

// ── Span macros ─────────────────────────────────────────────────────────────

#[test]
fn span_macros_expand_without_a_subscriber() {
    let detection = tandem_observability::detection_span!("alice", "bob");
    let submission = tandem_observability::submission_span!("event-1", "alice");
    let approval = tandem_observability::approval_span!("contrib-1", "bob");
    let resolution = tandem_observability::resolution_span!("conflict-1", "reject_all");

    // Entering disabled spans is a no-op.
    let _d = detection.enter();
    let _s = submission.enter();
    let _a = approval.enter();
    let _r = resolution.enter();
}

#[test]
fn span_names_are_namespaced() {
    for name in [
        names::DETECTION,
        names::SUBMISSION,
        names::APPROVAL,
        names::RESOLUTION,
    ] {
        assert!(name.starts_with("tandem."), "{name} should be namespaced");
    }
}

// ── Events ──────────────────────────────────────────────────────────────────

#[test]
fn event_helpers_emit_without_a_subscriber() {
    events::shared_events_detected("alice", "bob", 3, 2);
    events::shared_event_accepted("event-1", "match-abc", 2);
    events::shared_event_lifecycle_changed("event-1", "active", "archived");
    events::contribution_submitted("event-1", "contrib-1", "title_edit", 0);
    events::conflict_detected("event-1", "conflict-1", "simultaneous_edit", 2);
    events::version_created("event-1", "ver-2", 2);
    events::conflict_resolved("event-1", "conflict-1", "accept_latest", "alice");
    events::permission_denied("event-1", "mallory", "submit");
    events::session_started("event-1", "session-1", 2);
    events::session_ended("event-1", "session-1", "idle");
}

// ── Subscriber setup ────────────────────────────────────────────────────────

#[test]
fn init_from_config_rejects_a_second_global_subscriber() {
    let config = ObservabilityConfig {
        log_level: "debug".into(),
        json_logs: false,
    };
    // The first call may fail if another test in this binary already
    // installed a subscriber; the second one always does.
    let _ = tandem_observability::init_from_config(&config);
    let second = tandem_observability::init_from_config(&config);
    assert!(second.is_err());
}
