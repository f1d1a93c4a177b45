use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tandem_core::models::*;
use tandem_core::{EventId, UserId};

fn noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

// ── EventPoint ────────────────────────────────────────────────────────────

#[test]
fn event_point_coordinates_are_both_or_neither() {
    let base = EventPoint::new("e-1", "alice", noon());

    assert!(base.clone().with_coordinates(Some(40.0), None).is_err());
    assert!(base.clone().with_coordinates(None, Some(-74.0)).is_err());

    let none = base.clone().with_coordinates(None, None).unwrap();
    assert!(none.location.is_none());

    let both = base.with_coordinates(Some(40.0), Some(-74.0)).unwrap();
    assert_eq!(both.location, Some(GeoPoint { lat: 40.0, lon: -74.0 }));
}

#[test]
fn geo_point_rejects_out_of_range_and_non_finite() {
    assert!(GeoPoint::new(90.5, 0.0).is_err());
    assert!(GeoPoint::new(0.0, -180.5).is_err());
    assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    assert!(GeoPoint::new(-90.0, 180.0).is_ok());
}

#[test]
fn event_point_deserializes_with_optional_fields_missing() {
    let event: EventPoint = serde_json::from_value(json!({
        "id": "e-7",
        "owner_id": "bob",
        "timestamp": "2024-06-01T12:00:00Z"
    }))
    .unwrap();
    assert_eq!(event.owner_id, UserId::from("bob"));
    assert!(event.location.is_none());
    assert!(event.has_face_signature.is_none());
    assert!(event.attributes.is_empty());
}

// ── ContributionChange ────────────────────────────────────────────────────

#[test]
fn contribution_change_serializes_with_type_tag() {
    let change = ContributionChange::TitleEdit {
        title: "Trip".into(),
    };
    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value, json!({"type": "title_edit", "title": "Trip"}));

    let back: ContributionChange = serde_json::from_value(value).unwrap();
    assert_eq!(back, change);
}

#[test]
fn story_variants_share_the_story_field() {
    let edit = ContributionChange::StoryEdit { text: "a".into() };
    let add = ContributionChange::StoryAddition { text: "b".into() };
    assert_eq!(edit.field_key(), add.field_key());
    assert_ne!(edit.contribution_type(), add.contribution_type());
}

#[test]
fn supplied_participant_covers_add_remove_and_custom_payloads() {
    let add = ContributionChange::ParticipantAdd {
        participant_id: "carol".into(),
    };
    assert_eq!(add.supplied_participant(), Some(UserId::from("carol")));

    let mut payload = BTreeMap::new();
    payload.insert("participantId".to_string(), json!("dave"));
    let custom = ContributionChange::Custom {
        kind: "tag_person".into(),
        payload,
    };
    assert_eq!(custom.supplied_participant(), Some(UserId::from("dave")));
    assert_eq!(custom.field_key(), "custom:tag_person");

    let title = ContributionChange::TitleEdit { title: "x".into() };
    assert_eq!(title.supplied_participant(), None);
}

#[test]
fn change_summaries_are_human_readable() {
    let change = ContributionChange::TitleEdit {
        title: "Vacation".into(),
    };
    assert_eq!(change.summary(), "Changed title to \"Vacation\"");

    let change = ContributionChange::LocationUpdate {
        location: EventLocation {
            lat: 1.0,
            lon: 2.0,
            name: Some("Harbor".into()),
        },
    };
    assert_eq!(change.summary(), "Moved location to Harbor");
}

// ── SharedEventMatch ──────────────────────────────────────────────────────

#[test]
fn match_ids_are_deterministic_and_type_specific() {
    let a = EventId::from("e-1");
    let b = EventId::from("e-2");

    let first = SharedEventMatch::derive_id(DetectionType::Temporal, &a, &b);
    let second = SharedEventMatch::derive_id(DetectionType::Temporal, &a, &b);
    let spatial = SharedEventMatch::derive_id(DetectionType::Spatial, &a, &b);
    let swapped = SharedEventMatch::derive_id(DetectionType::Temporal, &b, &a);

    assert_eq!(first, second);
    assert_ne!(first, spatial);
    assert_ne!(first, swapped);
    assert!(first.as_str().starts_with("match-"));
}

#[test]
fn coverage_key_ignores_participant_order() {
    let make = |participants: Vec<&str>| SharedEventMatch {
        id: "m".into(),
        participant_ids: participants.into_iter().map(UserId::from).collect(),
        reference_event_id: "e-1".into(),
        detected_at: noon(),
        confidence_score: 1.0,
        detection_type: DetectionType::Temporal,
        detection_metadata: DetectionMetadata {
            peer_event_id: "e-2".into(),
            time_delta_minutes: 0.0,
            distance_m: None,
            factors: vec![],
        },
    };
    assert_eq!(
        make(vec!["bob", "alice"]).coverage_key(),
        make(vec!["alice", "bob"]).coverage_key()
    );
}

// ── Lifecycle & status ────────────────────────────────────────────────────

#[test]
fn lifecycle_transitions_follow_the_table() {
    use EventLifecycle::*;
    assert!(Active.can_transition_to(Bifurcated));
    assert!(Redacted.can_transition_to(Deleted));
    assert!(!Redacted.can_transition_to(Active));
    assert!(!Bifurcated.can_transition_to(Active));
    assert!(!Active.can_transition_to(Active));
    assert!(!Deleted.can_transition_to(Archived));
}

#[test]
fn conflict_status_only_carries_resolution_when_resolved() {
    let open = ConflictStatus::Open;
    assert_eq!(open.strategy(), None);
    assert_eq!(serde_json::to_value(&open).unwrap(), json!({"state": "open"}));

    let resolved = ConflictStatus::Resolved {
        strategy: ResolutionStrategy::RejectAll,
        resolved_by: "alice".into(),
        resolved_at: noon(),
    };
    assert!(!resolved.is_open());
    assert_eq!(resolved.strategy(), Some(ResolutionStrategy::RejectAll));
}

#[test]
fn mutation_records_report_their_kind() {
    let record = MutationRecord::ContributionRemoved {
        contribution_id: "contrib-1".into(),
    };
    assert_eq!(record.kind(), RecordKind::Contribution);

    let record = MutationRecord::VersionSuperseded {
        version_id: "ver-1".into(),
    };
    assert_eq!(record.kind(), RecordKind::Version);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["record"], "version_superseded");
}

#[test]
fn date_scope_bounds_are_inclusive() {
    let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let scope = DateScope::Between { from, to };
    assert!(scope.covers(from));
    assert!(scope.covers(to));
    assert!(!DateScope::None.covers(from));
    assert!(!PermissionScope::read_only().allows_edit_at(from));
}
