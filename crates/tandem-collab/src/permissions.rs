//! Edit and approval rights derived from the relationship graph.

use std::sync::Arc;

use tandem_core::config::ApprovalPolicy;
use tandem_core::models::{Contribution, SharedEvent};
use tandem_core::traits::RelationshipProvider;
use tandem_core::UserId;

#[derive(Clone)]
pub struct PermissionGate {
    relationships: Arc<dyn RelationshipProvider>,
    policy: ApprovalPolicy,
}

impl PermissionGate {
    pub fn new(relationships: Arc<dyn RelationshipProvider>, policy: ApprovalPolicy) -> Self {
        Self {
            relationships,
            policy,
        }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    /// A participant may edit when another participant, actively connected
    /// to them, grants edit rights whose date scope covers the event.
    pub fn can_edit(&self, event: &SharedEvent, user: &UserId) -> bool {
        if !event.is_participant(user) {
            return false;
        }
        event
            .participant_ids
            .iter()
            .filter(|p| *p != user)
            .any(|grantor| {
                self.relationships.is_active_connection(grantor, user)
                    && self
                        .relationships
                        .permission_scope(grantor, user)
                        .is_some_and(|scope| scope.allows_edit_at(event.occurred_at))
            })
    }

    /// Approval (and resolution) rights under the configured policy.
    ///
    /// `contribution` is the one being approved, when there is one.
    pub fn can_approve(
        &self,
        event: &SharedEvent,
        approver: &UserId,
        contribution: Option<&Contribution>,
    ) -> bool {
        match self.policy {
            ApprovalPolicy::SameAsEdit => self.can_edit(event, approver),
            ApprovalPolicy::OwnerOnly => &event.owner_id == approver,
            ApprovalPolicy::OtherParticipant => {
                self.can_edit(event, approver)
                    && contribution.map_or(true, |c| &c.contributor_id != approver)
            }
        }
    }

    pub fn display_name(&self, user: &UserId) -> String {
        self.relationships
            .display_name(user)
            .unwrap_or_else(|| user.to_string())
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
