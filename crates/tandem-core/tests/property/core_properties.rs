use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tandem_core::models::*;
use tandem_core::{EventId, UserId};

fn arb_change() -> impl Strategy<Value = ContributionChange> {
    prop_oneof![
        ".{0,32}".prop_map(|title| ContributionChange::TitleEdit { title }),
        ".{0,64}".prop_map(|text| ContributionChange::StoryAddition { text }),
        (-90.0f64..=90.0, -180.0f64..=180.0, proptest::option::of("[a-z ]{1,16}")).prop_map(
            |(lat, lon, name)| ContributionChange::LocationUpdate {
                location: EventLocation { lat, lon, name },
            }
        ),
        ("[a-zA-Z]{1,12}", any::<i64>()).prop_map(|(attribute, n)| {
            ContributionChange::AttributeChange {
                attribute,
                value: serde_json::json!(n),
            }
        }),
        "[a-z]{1,8}".prop_map(|id| ContributionChange::ParticipantRemove {
            participant_id: UserId::from(id),
        }),
        ("[a-z_]{1,10}", "[a-z]{1,6}", ".{0,16}").prop_map(|(kind, key, text)| {
            let mut payload = BTreeMap::new();
            payload.insert(key, serde_json::json!(text));
            ContributionChange::Custom { kind, payload }
        }),
    ]
}

fn detected(participants: Vec<String>, reference: String, peer: String) -> SharedEventMatch {
    SharedEventMatch {
        id: "m".into(),
        participant_ids: participants.into_iter().map(UserId::from).collect(),
        reference_event_id: EventId::from(reference),
        detected_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        confidence_score: 1.0,
        detection_type: DetectionType::Temporal,
        detection_metadata: DetectionMetadata {
            peer_event_id: EventId::from(peer),
            time_delta_minutes: 0.0,
            distance_m: None,
            factors: vec![],
        },
    }
}

proptest! {
    #[test]
    fn changes_keep_their_kind_and_field_through_json(change in arb_change()) {
        let json = serde_json::to_string(&change).unwrap();
        let back: ContributionChange = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.contribution_type(), change.contribution_type());
        prop_assert_eq!(back.field_key(), change.field_key());
        prop_assert_eq!(back, change);
    }

    #[test]
    fn coverage_depends_only_on_the_participant_set(
        a in "[a-z]{1,6}",
        b in "[a-z]{1,6}",
        events in ("e-[0-9]{1,3}", "e-[0-9]{1,3}", "e-[0-9]{1,3}", "e-[0-9]{1,3}"),
    ) {
        let (r1, p1, r2, p2) = events;
        let forward = detected(vec![a.clone(), b.clone()], r1, p1);
        let reversed = detected(vec![b, a], r2, p2);
        prop_assert_eq!(forward.coverage_key(), reversed.coverage_key());
    }

    #[test]
    fn geo_points_accept_exactly_the_valid_range(lat in -200.0f64..200.0, lon in -400.0f64..400.0) {
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        prop_assert_eq!(GeoPoint::new(lat, lon).is_ok(), valid);
    }

    #[test]
    fn match_ids_are_stable_and_direction_sensitive(
        reference in "[a-z0-9-]{1,12}",
        peer in "[a-z0-9-]{1,12}",
    ) {
        let r = EventId::from(reference.as_str());
        let p = EventId::from(peer.as_str());
        let id = SharedEventMatch::derive_id(DetectionType::Spatial, &r, &p);
        prop_assert_eq!(&id, &SharedEventMatch::derive_id(DetectionType::Spatial, &r, &p));
        prop_assert_ne!(&id, &SharedEventMatch::derive_id(DetectionType::Temporal, &r, &p));
        if reference != peer {
            prop_assert_ne!(&id, &SharedEventMatch::derive_id(DetectionType::Spatial, &p, &r));
        }
    }
}
