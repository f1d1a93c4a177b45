use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use tandem_collab::{AttributionTracker, CollaborationEngine};
use tandem_core::models::{ContributionChange, ResolutionStrategy};
use tandem_core::{CollabError, EventId, UserId};
use test_fixtures::{at, shared_event, FixedClock, InMemoryRelationships, SequentialIds};

const USERS: [&str; 3] = ["alice", "bob", "carol"];
const STRATEGIES: [ResolutionStrategy; 4] = [
    ResolutionStrategy::AcceptLatest,
    ResolutionStrategy::AcceptEarliest,
    ResolutionStrategy::RejectAll,
    ResolutionStrategy::ManualResolution,
];

#[derive(Debug, Clone)]
enum Op {
    Submit { user: usize, kind: usize },
    Approve { pick: usize, approver: usize },
    Resolve { pick: usize, resolver: usize, strategy: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..USERS.len(), 0..6usize).prop_map(|(user, kind)| Op::Submit { user, kind }),
        2 => (0..64usize, 0..USERS.len())
            .prop_map(|(pick, approver)| Op::Approve { pick, approver }),
        1 => (0..64usize, 0..USERS.len(), 0..STRATEGIES.len()).prop_map(
            |(pick, resolver, strategy)| Op::Resolve { pick, resolver, strategy }
        ),
    ]
}

fn change(kind: usize, n: usize) -> ContributionChange {
    match kind {
        0 => ContributionChange::TitleEdit { title: format!("title {n}") },
        1 => ContributionChange::StoryAddition { text: format!("segment {n}") },
        2 => ContributionChange::AttributeChange {
            attribute: "mood".into(),
            value: serde_json::json!(n),
        },
        3 => ContributionChange::AttributeChange {
            attribute: "privacyLevel".into(),
            value: serde_json::json!(if n % 2 == 0 { "private" } else { "public" }),
        },
        4 => ContributionChange::ParticipantAdd { participant_id: "dave".into() },
        _ => ContributionChange::DescriptionEdit { description: format!("description {n}") },
    }
}

fn setup() -> (CollaborationEngine, Arc<FixedClock>, EventId) {
    let relationships = Arc::new(InMemoryRelationships::new());
    relationships
        .connect("alice", "bob")
        .connect("alice", "carol")
        .connect("bob", "carol");
    let clock = Arc::new(FixedClock::default());
    let engine = CollaborationEngine::builder(relationships)
        .clock(clock.clone())
        .id_generator(Arc::new(SequentialIds::new()))
        .build();
    let event = engine
        .register_shared_event(shared_event("trip", &USERS, at(9, 0, 0)))
        .unwrap();
    (engine, clock, event.id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_across_any_operation_sequence(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (engine, clock, event_id) = setup();

        for (n, op) in ops.into_iter().enumerate() {
            clock.advance(Duration::seconds(30));
            match op {
                Op::Submit { user, kind } => {
                    let _ = engine.submit_contribution(&event_id, &USERS[user].into(), change(kind, n));
                }
                Op::Approve { pick, approver } => {
                    let ledger = engine.contributions_for(&event_id).unwrap();
                    if ledger.is_empty() {
                        continue;
                    }
                    let target = &ledger[pick % ledger.len()];
                    let blocked = engine
                        .conflicts_for(&event_id)
                        .unwrap()
                        .iter()
                        .any(|c| c.is_open() && c.references(&target.id));
                    let result = engine.approve_contribution(&target.id, &USERS[approver].into());
                    if blocked && target.is_pending() {
                        let err = result.expect_err("approval of a conflicted contribution");
                        let is_blocked = matches!(
                            err.as_collab(),
                            Some(CollabError::BlockedByConflict { .. })
                        );
                        prop_assert!(is_blocked);
                    }
                }
                Op::Resolve { pick, resolver, strategy } => {
                    let conflicts = engine.conflicts_for(&event_id).unwrap();
                    if conflicts.is_empty() {
                        continue;
                    }
                    let target = &conflicts[pick % conflicts.len()];
                    let _ = engine.resolve_conflict(
                        &target.id,
                        &USERS[resolver].into(),
                        STRATEGIES[strategy],
                    );
                }
            }
        }

        // Version chain: gap-free numbering, one current, linked parents.
        let versions = engine.versions_for(&event_id).unwrap();
        for (i, v) in versions.iter().enumerate() {
            prop_assert_eq!(v.version_number as usize, i + 1);
            match i {
                0 => prop_assert!(v.parent_version_id.is_none()),
                _ => prop_assert_eq!(v.parent_version_id.as_ref(), Some(&versions[i - 1].id)),
            }
        }
        if !versions.is_empty() {
            prop_assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
            prop_assert!(versions.last().is_some_and(|v| v.is_current));
        }

        // Every approval produced exactly one version.
        let ledger = engine.contributions_for(&event_id).unwrap();
        let approved: Vec<_> = ledger.iter().filter(|c| c.is_approved()).collect();
        prop_assert_eq!(versions.len().saturating_sub(1), approved.len());
        for contribution in &approved {
            let version_id = &contribution.approval.as_ref().unwrap().new_version_id;
            prop_assert!(versions.iter().any(|v| &v.id == version_id));
        }

        // Attribution mirrors approvals.
        let attribution = engine.attribution_for(&event_id).unwrap();
        prop_assert!(AttributionTracker::is_consistent(&attribution));
        prop_assert_eq!(attribution.total_contributions as usize, approved.len());

        // Conflicts only reference known contributions or removed ones, never approved pairs.
        for conflict in engine.conflicts_for(&event_id).unwrap() {
            if conflict.is_open() {
                let approved_members = conflict
                    .conflicting_contribution_ids
                    .iter()
                    .filter(|id| approved.iter().any(|c| &&c.id == id))
                    .count();
                prop_assert_eq!(approved_members, 0);
            }
        }
    }

    #[test]
    fn two_users_editing_a_title_always_conflict(
        first in "[a-zA-Z ]{1,24}",
        second in "[a-zA-Z ]{1,24}",
        users in (0..USERS.len(), 1..USERS.len()),
    ) {
        let (engine, _, event_id) = setup();
        let a = UserId::from(USERS[users.0]);
        let b = UserId::from(USERS[(users.0 + users.1) % USERS.len()]);

        engine
            .submit_contribution(&event_id, &a, ContributionChange::TitleEdit { title: first })
            .unwrap();
        let later = engine
            .submit_contribution(&event_id, &b, ContributionChange::TitleEdit { title: second })
            .unwrap();

        prop_assert_eq!(later.conflicts_with.len(), 1);
        let conflict = engine.conflict(&later.conflicts_with[0]).unwrap();
        prop_assert_eq!(conflict.conflicting_user_ids, vec![a, b]);
    }
}
