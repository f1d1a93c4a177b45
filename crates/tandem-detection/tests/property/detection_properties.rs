use chrono::Duration;
use proptest::prelude::*;
use tandem_core::models::{DetectionType, EventPoint};
use tandem_detection::{SharedEventDetector, TemporalDetector};
use test_fixtures::{at, located_event};

fn arb_event(id: &'static str, owner: &'static str) -> impl Strategy<Value = EventPoint> {
    (
        0i64..(48 * 60),
        proptest::option::of((39.99f64..40.01, -74.01f64..-73.99)),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(move |(minutes, coords, face)| {
            let mut e = EventPoint::new(id, owner, at(0, 0, 0) + Duration::minutes(minutes));
            if let Some((lat, lon)) = coords {
                e = e.with_coordinates(Some(lat), Some(lon)).unwrap();
            }
            e.has_face_signature = face;
            e
        })
}

proptest! {
    #[test]
    fn confidence_is_always_within_unit_range(
        a in arb_event("a-1", "alice"),
        b in arb_event("b-1", "bob"),
    ) {
        let matches = SharedEventDetector::default().detect(&[a], &[b]);
        for m in &matches {
            prop_assert!((0.0..=1.0).contains(&m.confidence_score));
            prop_assert_eq!(m.participant_ids.len(), 2);
            prop_assert_ne!(&m.participant_ids[0], &m.participant_ids[1]);
        }
    }

    #[test]
    fn distant_pairs_without_faces_never_match(
        gap_minutes in 61i64..5_000,
        lat_offset in 0.002f64..0.5,
    ) {
        let a = located_event("a-1", "alice", at(0, 0, 0), 40.0, -74.0);
        let b = located_event(
            "b-1",
            "bob",
            at(0, 0, 0) + Duration::minutes(gap_minutes),
            40.0 + lat_offset,
            -74.0,
        );
        prop_assert!(SharedEventDetector::default().detect(&[a], &[b]).is_empty());
    }

    #[test]
    fn temporal_confidence_is_monotonic(m1 in 0.0f64..=60.0, m2 in 0.0f64..=60.0) {
        let detector = TemporalDetector::default();
        let (near, far) = if m1 <= m2 { (m1, m2) } else { (m2, m1) };
        let c_near = detector.confidence_for(near).unwrap();
        let c_far = detector.confidence_for(far).unwrap();
        prop_assert!(c_near >= c_far);
        prop_assert!(c_far >= 0.6);
    }

    #[test]
    fn spatial_only_proximity_never_yields_hybrid(
        gap_minutes in 121i64..5_000,
        lat_offset in 0.0f64..0.0015,
    ) {
        let a = located_event("a-1", "alice", at(0, 0, 0), 40.0, -74.0);
        let b = located_event(
            "b-1",
            "bob",
            at(0, 0, 0) + Duration::minutes(gap_minutes),
            40.0 + lat_offset,
            -74.0,
        );
        let matches = SharedEventDetector::default().detect(&[a], &[b]);
        prop_assert!(matches.iter().all(|m| m.detection_type != DetectionType::Hybrid));
    }

    #[test]
    fn near_in_time_and_space_yields_a_single_temporal_match(
        gap_minutes in 0i64..=60,
        lat_offset in 0.0f64..0.0008,
    ) {
        let a = located_event("a-1", "alice", at(12, 0, 0), 40.0, -74.0);
        let b = located_event(
            "b-1",
            "bob",
            at(12, 0, 0) + Duration::minutes(gap_minutes),
            40.0 + lat_offset,
            -74.0,
        );
        let matches = SharedEventDetector::default().detect(&[a], &[b]);
        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(matches[0].detection_type, DetectionType::Temporal);
    }
}
