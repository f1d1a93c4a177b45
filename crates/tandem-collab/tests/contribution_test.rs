//! Contribution ledger, conflict detection, approval and version chain,
//! driven through the engine.

use std::sync::Arc;

use chrono::Duration;
use tandem_collab::CollaborationEngine;
use tandem_core::config::{ApprovalPolicy, CollabConfig};
use tandem_core::constants::BASELINE_CHANGE_SUMMARY;
use tandem_core::models::{
    Contribution, ContributionChange, ContributionType, ConflictType, DateScope, EventLocation,
    PermissionScope,
};
use tandem_core::{CollabError, EventId, TandemError, UserId};
use test_fixtures::{at, shared_event, FixedClock, InMemoryRelationships, SequentialIds};

struct Harness {
    engine: CollaborationEngine,
    clock: Arc<FixedClock>,
    relationships: Arc<InMemoryRelationships>,
    event_id: EventId,
}

impl Harness {
    fn new(config: CollabConfig) -> Self {
        let relationships = Arc::new(InMemoryRelationships::new());
        relationships
            .connect("alice", "bob")
            .connect("alice", "carol")
            .connect("bob", "carol");
        Self::with_relationships(config, relationships)
    }

    fn with_relationships(config: CollabConfig, relationships: Arc<InMemoryRelationships>) -> Self {
        let clock = Arc::new(FixedClock::default());
        let engine = CollaborationEngine::builder(relationships.clone())
            .config(config)
            .clock(clock.clone())
            .id_generator(Arc::new(SequentialIds::new()))
            .build();
        let event = engine
            .register_shared_event(shared_event("trip", &["alice", "bob", "carol"], at(9, 0, 0)))
            .unwrap();
        Self {
            engine,
            clock,
            relationships,
            event_id: event.id,
        }
    }

    fn submit(&self, user: &str, change: ContributionChange) -> Contribution {
        let contribution = self
            .engine
            .submit_contribution(&self.event_id, &user.into(), change)
            .unwrap();
        self.clock.advance(Duration::minutes(1));
        contribution
    }

    fn try_submit(&self, user: &str, change: ContributionChange) -> Result<Contribution, TandemError> {
        self.engine
            .submit_contribution(&self.event_id, &user.into(), change)
    }
}

fn title(text: &str) -> ContributionChange {
    ContributionChange::TitleEdit { title: text.into() }
}

fn attribute(key: &str, value: serde_json::Value) -> ContributionChange {
    ContributionChange::AttributeChange {
        attribute: key.into(),
        value,
    }
}

fn collab(err: &TandemError) -> &CollabError {
    err.as_collab()
        .unwrap_or_else(|| panic!("expected a collaboration error, got {err}"))
}

// ── Baseline & ledger ───────────────────────────────────────────────────────

#[test]
fn first_submission_seeds_the_baseline_version() {
    let h = Harness::new(CollabConfig::default());
    let contribution = h.submit("alice", title("Trip"));

    let versions = h.engine.versions_for(&h.event_id).unwrap();
    assert_eq!(versions.len(), 1);
    let v1 = &versions[0];
    assert_eq!(v1.version_number, 1);
    assert!(v1.is_current);
    assert!(v1.parent_version_id.is_none());
    assert_eq!(v1.change_summary, BASELINE_CHANGE_SUMMARY);
    assert_eq!(v1.created_by, UserId::from("alice"));
    assert!(v1.contributor_ids.is_empty());
    assert_eq!(v1.event_data.title, None);
    assert_eq!(
        v1.event_data.participant_ids,
        vec![UserId::from("alice"), UserId::from("bob"), UserId::from("carol")]
    );

    assert!(contribution.is_pending());
    assert_eq!(contribution.previous_version_id, Some(v1.id.clone()));
    assert_eq!(contribution.timestamp, at(10, 0, 0));
    assert_eq!(contribution.contribution_type(), ContributionType::TitleEdit);
}

#[test]
fn ledger_keeps_submission_order() {
    let h = Harness::new(CollabConfig::default());
    let first = h.submit("alice", title("Trip"));
    let second = h.submit("alice", ContributionChange::StoryAddition { text: "We hiked.".into() });
    let third = h.submit("bob", attribute("mood", serde_json::json!("great")));

    let ids: Vec<_> = h
        .engine
        .contributions_for(&h.event_id)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn unknown_event_is_reported() {
    let h = Harness::new(CollabConfig::default());
    let err = h
        .engine
        .submit_contribution(&"nowhere".into(), &"alice".into(), title("Trip"))
        .unwrap_err();
    assert!(matches!(collab(&err), CollabError::EventNotFound(id) if id == "nowhere"));
}

// ── Conflict detection ──────────────────────────────────────────────────────

#[test]
fn concurrent_title_edits_conflict() {
    let h = Harness::new(CollabConfig::default());
    let alice = h.submit("alice", title("Trip"));
    let bob = h.submit("bob", title("Vacation"));

    assert!(alice.conflicts_with.is_empty());
    assert_eq!(bob.conflicts_with.len(), 1);

    let conflicts = h.engine.conflicts_for(&h.event_id).unwrap();
    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.id, bob.conflicts_with[0]);
    assert_eq!(conflict.conflict_type, ConflictType::SimultaneousEdit);
    assert!(conflict.is_open());
    assert_eq!(conflict.conflicting_contribution_ids, vec![alice.id, bob.id]);
    assert_eq!(
        conflict.conflicting_user_ids,
        vec![UserId::from("alice"), UserId::from("bob")]
    );
    assert_eq!(conflict.detected_at, at(10, 1, 0));
}

#[test]
fn a_user_never_conflicts_with_themselves() {
    let h = Harness::new(CollabConfig::default());
    h.submit("alice", title("Trip"));
    let again = h.submit("alice", title("Road trip"));
    assert!(again.conflicts_with.is_empty());
    assert!(h.engine.conflicts_for(&h.event_id).unwrap().is_empty());
}

#[test]
fn story_rewrite_and_addition_share_a_field() {
    let h = Harness::new(CollabConfig::default());
    h.submit("alice", ContributionChange::StoryEdit { text: "It rained.".into() });
    let bob = h.submit("bob", ContributionChange::StoryAddition { text: "Then sun.".into() });
    assert_eq!(bob.conflicts_with.len(), 1);
}

#[test]
fn attributes_only_collide_on_the_same_key() {
    let h = Harness::new(CollabConfig::default());
    h.submit("alice", attribute("mood", serde_json::json!("great")));
    let weather = h.submit("bob", attribute("weather", serde_json::json!("sunny")));
    assert!(weather.conflicts_with.is_empty());

    let mood = h.submit("carol", attribute("mood", serde_json::json!("tired")));
    assert_eq!(mood.conflicts_with.len(), 1);
}

#[test]
fn removing_a_participant_someone_adds_is_an_integrity_conflict() {
    let h = Harness::new(CollabConfig::default());
    h.submit("alice", ContributionChange::ParticipantAdd { participant_id: "dave".into() });
    let removal = h.submit(
        "bob",
        ContributionChange::ParticipantRemove { participant_id: "dave".into() },
    );

    let conflict = h.engine.conflict(&removal.conflicts_with[0]).unwrap();
    assert_eq!(conflict.conflict_type, ConflictType::DataIntegrity);
}

#[test]
fn concurrent_privacy_changes_are_integrity_conflicts() {
    let h = Harness::new(CollabConfig::default());
    h.submit("alice", attribute("privacyLevel", serde_json::json!("private")));
    let bob = h.submit("bob", attribute("privacyLevel", serde_json::json!("public")));

    let conflicts = h.engine.conflicts_for(&h.event_id).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, bob.conflicts_with[0]);
    assert_eq!(conflicts[0].conflict_type, ConflictType::DataIntegrity);
}

#[test]
fn a_third_edit_joins_all_pending_rivals_in_one_conflict() {
    let h = Harness::new(CollabConfig::default());
    let alice = h.submit("alice", title("Trip"));
    let bob = h.submit("bob", title("Vacation"));
    let carol = h.submit("carol", title("Getaway"));

    assert_eq!(carol.conflicts_with.len(), 1);
    let latest = h.engine.conflict(&carol.conflicts_with[0]).unwrap();
    assert_eq!(
        latest.conflicting_contribution_ids,
        vec![alice.id.clone(), bob.id.clone(), carol.id]
    );
    // Earlier conflicts are left as they were.
    assert_eq!(h.engine.conflicts_for(&h.event_id).unwrap().len(), 2);
    assert!(h.engine.contribution(&alice.id).unwrap().conflicts_with.is_empty());
}

// ── Approval ────────────────────────────────────────────────────────────────

#[test]
fn approval_creates_the_next_version() {
    let h = Harness::new(CollabConfig::default());
    let contribution = h.submit("alice", title("Trip"));

    let v2 = h
        .engine
        .approve_contribution(&contribution.id, &"bob".into())
        .unwrap();

    assert_eq!(v2.version_number, 2);
    assert!(v2.is_current);
    assert_eq!(v2.event_data.title.as_deref(), Some("Trip"));
    assert_eq!(v2.created_by, UserId::from("alice"));
    assert_eq!(v2.contributor_ids, vec![UserId::from("alice")]);
    assert_eq!(v2.contributor_names, vec!["alice".to_string()]);
    assert_eq!(v2.change_summary, "Changed title to \"Trip\"");

    let versions = h.engine.versions_for(&h.event_id).unwrap();
    assert_eq!(versions.len(), 2);
    assert!(!versions[0].is_current);
    assert_eq!(v2.parent_version_id, Some(versions[0].id.clone()));

    let approved = h.engine.contribution(&contribution.id).unwrap();
    let approval = approved.approval.expect("approval stamp");
    assert_eq!(approval.approved_by, UserId::from("bob"));
    assert_eq!(approval.new_version_id, v2.id);
    assert_eq!(approval.approved_at, at(10, 1, 0));
}

#[test]
fn approving_twice_fails() {
    let h = Harness::new(CollabConfig::default());
    let contribution = h.submit("alice", title("Trip"));
    h.engine
        .approve_contribution(&contribution.id, &"bob".into())
        .unwrap();

    let err = h
        .engine
        .approve_contribution(&contribution.id, &"carol".into())
        .unwrap_err();
    assert!(matches!(collab(&err), CollabError::AlreadyApproved(_)));
    assert_eq!(h.engine.versions_for(&h.event_id).unwrap().len(), 2);
}

#[test]
fn open_conflict_blocks_approval() {
    let h = Harness::new(CollabConfig::default());
    let alice = h.submit("alice", title("Trip"));
    let bob = h.submit("bob", title("Vacation"));

    let err = h
        .engine
        .approve_contribution(&alice.id, &"carol".into())
        .unwrap_err();
    match collab(&err) {
        CollabError::BlockedByConflict {
            contribution,
            conflicts,
        } => {
            assert_eq!(contribution, alice.id.as_str());
            assert_eq!(conflicts, &vec![bob.conflicts_with[0].to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.engine.versions_for(&h.event_id).unwrap().len(), 1);
    assert!(h.engine.contribution(&alice.id).unwrap().is_pending());
}

#[test]
fn approvals_layer_changes_in_approval_order() {
    let h = Harness::new(CollabConfig::default());
    let named = h.submit("alice", title("Trip"));
    let located = h.submit(
        "bob",
        ContributionChange::LocationUpdate {
            location: EventLocation {
                lat: 40.7,
                lon: -73.9,
                name: Some("Central Park".into()),
            },
        },
    );
    let story = h.submit("carol", ContributionChange::StoryAddition { text: "Picnic.".into() });

    h.engine.approve_contribution(&located.id, &"alice".into()).unwrap();
    h.engine.approve_contribution(&named.id, &"carol".into()).unwrap();
    let v4 = h.engine.approve_contribution(&story.id, &"bob".into()).unwrap();

    assert_eq!(v4.version_number, 4);
    assert_eq!(v4.event_data.title.as_deref(), Some("Trip"));
    assert_eq!(
        v4.event_data.location.as_ref().and_then(|l| l.name.as_deref()),
        Some("Central Park")
    );
    assert_eq!(v4.event_data.story, vec!["Picnic.".to_string()]);
    assert_eq!(
        v4.contributor_ids,
        vec![UserId::from("bob"), UserId::from("alice"), UserId::from("carol")]
    );
}

#[test]
fn approving_a_participant_change_updates_the_event() {
    let h = Harness::new(CollabConfig::default());
    let add = h.submit("alice", ContributionChange::ParticipantAdd { participant_id: "dave".into() });
    h.engine.approve_contribution(&add.id, &"bob".into()).unwrap();

    let event = h.engine.shared_event(&h.event_id).unwrap();
    assert!(event.is_participant(&"dave".into()));

    // Participation alone grants nothing until someone connects with dave.
    assert!(h.try_submit("dave", title("Dave's trip")).is_err());
    h.relationships.connect("alice", "dave");
    assert!(h.try_submit("dave", title("Dave's trip")).is_ok());
}

#[test]
fn display_names_come_from_the_relationship_graph() {
    let h = Harness::new(CollabConfig::default());
    h.relationships.set_display_name("alice", "Alice A.");
    let contribution = h.submit("alice", title("Trip"));
    let v2 = h
        .engine
        .approve_contribution(&contribution.id, &"bob".into())
        .unwrap();
    assert_eq!(v2.contributor_names, vec!["Alice A.".to_string()]);
}

// ── Attribution ─────────────────────────────────────────────────────────────

#[test]
fn attribution_credits_only_approved_work() {
    let h = Harness::new(CollabConfig::default());
    let first = h.submit("bob", title("Trip"));
    let second = h.submit("alice", ContributionChange::StoryAddition { text: "Day one.".into() });
    let third = h.submit("bob", attribute("mood", serde_json::json!("great")));
    h.submit("carol", ContributionChange::DescriptionEdit { description: "pending".into() });

    for id in [&first.id, &second.id, &third.id] {
        h.engine.approve_contribution(id, &"carol".into()).unwrap();
    }

    let attribution = h.engine.attribution_for(&h.event_id).unwrap();
    assert_eq!(attribution.total_contributions, 3);
    assert_eq!(attribution.contributors.len(), 2);

    let bob = attribution.contributor(&"bob".into()).unwrap();
    assert_eq!(bob.count, 2);
    assert!(bob.is_primary_contributor);
    assert_eq!(
        bob.contribution_types,
        vec![ContributionType::TitleEdit, ContributionType::AttributeChange]
    );
    assert_eq!(bob.first_contributed_at, at(10, 0, 0));
    assert_eq!(bob.last_contributed_at, at(10, 2, 0));

    let alice = attribution.contributor(&"alice".into()).unwrap();
    assert!(!alice.is_primary_contributor);
    assert!(attribution.contributor(&"carol".into()).is_none());
    assert_eq!(
        attribution.primary_contributor().map(|c| c.user_id.clone()),
        Some(UserId::from("bob"))
    );
}

// ── Permissions ─────────────────────────────────────────────────────────────

#[test]
fn non_participants_cannot_contribute() {
    let h = Harness::new(CollabConfig::default());
    h.relationships.connect("alice", "mallory");
    let err = h.try_submit("mallory", title("Mine")).unwrap_err();
    match collab(&err) {
        CollabError::PermissionDenied { user, event, .. } => {
            assert_eq!(user, "mallory");
            assert_eq!(event, "trip");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.engine.contributions_for(&h.event_id).unwrap().is_empty());
}

#[test]
fn disconnected_participants_lose_edit_rights() {
    let h = Harness::new(CollabConfig::default());
    h.relationships.disconnect("alice", "carol").disconnect("bob", "carol");
    let err = h.try_submit("carol", title("Getaway")).unwrap_err();
    assert!(matches!(collab(&err), CollabError::PermissionDenied { .. }));
    assert!(h.try_submit("bob", title("Vacation")).is_ok());
}

#[test]
fn date_scoped_grants_must_cover_the_event() {
    let relationships = Arc::new(InMemoryRelationships::new());
    relationships.connect("alice", "bob").connect_with_scope(
        "alice",
        "carol",
        PermissionScope {
            date_scope: DateScope::Between {
                from: at(12, 0, 0),
                to: at(23, 0, 0),
            },
            ..PermissionScope::full()
        },
    );
    let h = Harness::with_relationships(CollabConfig::default(), relationships.clone());
    assert!(h.try_submit("carol", title("Getaway")).is_err());

    relationships.connect_with_scope(
        "alice",
        "carol",
        PermissionScope {
            date_scope: DateScope::Between {
                from: at(0, 0, 0),
                to: at(12, 0, 0),
            },
            ..PermissionScope::full()
        },
    );
    assert!(h.try_submit("carol", title("Getaway")).is_ok());
}

#[test]
fn read_only_grants_do_not_allow_edits() {
    let relationships = Arc::new(InMemoryRelationships::new());
    relationships
        .connect("alice", "bob")
        .connect_with_scope("alice", "carol", PermissionScope::read_only());
    let h = Harness::with_relationships(CollabConfig::default(), relationships);
    assert!(h.try_submit("carol", title("Getaway")).is_err());
}

#[test]
fn owner_only_policy_reserves_approval_for_the_owner() {
    let h = Harness::new(CollabConfig {
        approval_policy: ApprovalPolicy::OwnerOnly,
        ..CollabConfig::default()
    });
    let contribution = h.submit("bob", title("Vacation"));

    let err = h
        .engine
        .approve_contribution(&contribution.id, &"carol".into())
        .unwrap_err();
    assert!(matches!(collab(&err), CollabError::PermissionDenied { .. }));
    assert!(h
        .engine
        .approve_contribution(&contribution.id, &"alice".into())
        .is_ok());
}

#[test]
fn other_participant_policy_forbids_self_approval() {
    let h = Harness::new(CollabConfig {
        approval_policy: ApprovalPolicy::OtherParticipant,
        ..CollabConfig::default()
    });
    let contribution = h.submit("bob", title("Vacation"));

    let err = h
        .engine
        .approve_contribution(&contribution.id, &"bob".into())
        .unwrap_err();
    assert!(matches!(collab(&err), CollabError::PermissionDenied { .. }));
    assert!(h
        .engine
        .approve_contribution(&contribution.id, &"alice".into())
        .is_ok());
}
