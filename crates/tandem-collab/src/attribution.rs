//! AttributionTracker: per-event contributor credit, updated on approval.

use tandem_core::models::{ContentAttribution, Contribution, ContributorCredit};

pub struct AttributionTracker;

impl AttributionTracker {
    /// Credit an approved contribution. The first contributor ever recorded
    /// on the event is the primary one.
    pub fn record(attribution: &mut ContentAttribution, contribution: &Contribution) {
        let at = contribution.timestamp;
        let kind = contribution.contribution_type();
        let is_first = attribution.contributors.is_empty();

        match attribution
            .contributors
            .iter_mut()
            .find(|c| c.user_id == contribution.contributor_id)
        {
            Some(credit) => {
                credit.count += 1;
                if !credit.contribution_types.contains(&kind) {
                    credit.contribution_types.push(kind);
                }
                credit.first_contributed_at = credit.first_contributed_at.min(at);
                credit.last_contributed_at = credit.last_contributed_at.max(at);
            }
            None => attribution.contributors.push(ContributorCredit {
                user_id: contribution.contributor_id.clone(),
                contribution_types: vec![kind],
                count: 1,
                first_contributed_at: at,
                last_contributed_at: at,
                is_primary_contributor: is_first,
            }),
        }
        attribution.total_contributions += 1;
    }

    /// Counts sum to the total and exactly one primary exists when non-empty.
    pub fn is_consistent(attribution: &ContentAttribution) -> bool {
        let sum: u32 = attribution.contributors.iter().map(|c| c.count).sum();
        let primaries = attribution
            .contributors
            .iter()
            .filter(|c| c.is_primary_contributor)
            .count();
        let expected_primaries = usize::from(!attribution.contributors.is_empty());
        sum == attribution.total_contributions && primaries == expected_primaries
    }
}
