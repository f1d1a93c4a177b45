//! Contributions: proposed edits to a shared event.
//!
//! Changes are a tagged union over the known edit kinds, with a `Custom`
//! variant carrying an opaque payload for extensions.
//!
//! # Examples
//!
//! ```
//! use tandem_core::models::contribution::{ContributionChange, ContributionType};
//!
//! let change = ContributionChange::TitleEdit { title: "Trip".into() };
//! assert_eq!(change.contribution_type(), ContributionType::TitleEdit);
//! assert_eq!(change.field_key(), "title");
//!
//! let attr = ContributionChange::AttributeChange {
//!     attribute: "mood".into(),
//!     value: serde_json::json!("happy"),
//! };
//! assert_eq!(attr.field_key(), "attribute:mood");
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{ConflictId, ContributionId, EventId, UserId, VersionId};
use crate::constants::PARTICIPANT_ID_KEY;

/// The kind of edit a contribution makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    TitleEdit,
    DescriptionEdit,
    StoryEdit,
    StoryAddition,
    LocationUpdate,
    AttributeChange,
    ParticipantAdd,
    ParticipantRemove,
    Custom,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::TitleEdit => "title_edit",
            ContributionType::DescriptionEdit => "description_edit",
            ContributionType::StoryEdit => "story_edit",
            ContributionType::StoryAddition => "story_addition",
            ContributionType::LocationUpdate => "location_update",
            ContributionType::AttributeChange => "attribute_change",
            ContributionType::ParticipantAdd => "participant_add",
            ContributionType::ParticipantRemove => "participant_remove",
            ContributionType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ContributionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named place attached to a shared event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: Option<String>,
}

/// The payload of a contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContributionChange {
    TitleEdit { title: String },
    DescriptionEdit { description: String },
    /// Replaces the whole story.
    StoryEdit { text: String },
    /// Appends one story segment.
    StoryAddition { text: String },
    LocationUpdate { location: EventLocation },
    AttributeChange {
        attribute: String,
        value: serde_json::Value,
    },
    ParticipantAdd { participant_id: UserId },
    ParticipantRemove { participant_id: UserId },
    /// Extension point for edit kinds the engine does not model.
    Custom {
        kind: String,
        payload: BTreeMap<String, serde_json::Value>,
    },
}

impl ContributionChange {
    pub fn contribution_type(&self) -> ContributionType {
        match self {
            ContributionChange::TitleEdit { .. } => ContributionType::TitleEdit,
            ContributionChange::DescriptionEdit { .. } => ContributionType::DescriptionEdit,
            ContributionChange::StoryEdit { .. } => ContributionType::StoryEdit,
            ContributionChange::StoryAddition { .. } => ContributionType::StoryAddition,
            ContributionChange::LocationUpdate { .. } => ContributionType::LocationUpdate,
            ContributionChange::AttributeChange { .. } => ContributionType::AttributeChange,
            ContributionChange::ParticipantAdd { .. } => ContributionType::ParticipantAdd,
            ContributionChange::ParticipantRemove { .. } => ContributionType::ParticipantRemove,
            ContributionChange::Custom { .. } => ContributionType::Custom,
        }
    }

    /// The field of the event data this change writes to.
    pub fn field_key(&self) -> String {
        match self {
            ContributionChange::TitleEdit { .. } => "title".to_string(),
            ContributionChange::DescriptionEdit { .. } => "description".to_string(),
            ContributionChange::StoryEdit { .. } | ContributionChange::StoryAddition { .. } => {
                "story".to_string()
            }
            ContributionChange::LocationUpdate { .. } => "location".to_string(),
            ContributionChange::AttributeChange { attribute, .. } => {
                format!("attribute:{attribute}")
            }
            ContributionChange::ParticipantAdd { .. }
            | ContributionChange::ParticipantRemove { .. } => "participants".to_string(),
            ContributionChange::Custom { kind, .. } => format!("custom:{kind}"),
        }
    }

    /// The value this change proposes for its field, as JSON.
    pub fn field_value(&self) -> serde_json::Value {
        match self {
            ContributionChange::TitleEdit { title } => serde_json::Value::from(title.as_str()),
            ContributionChange::DescriptionEdit { description } => {
                serde_json::Value::from(description.as_str())
            }
            ContributionChange::StoryEdit { text } | ContributionChange::StoryAddition { text } => {
                serde_json::Value::from(text.as_str())
            }
            ContributionChange::LocationUpdate { location } => {
                serde_json::to_value(location).unwrap_or(serde_json::Value::Null)
            }
            ContributionChange::AttributeChange { value, .. } => value.clone(),
            ContributionChange::ParticipantAdd { participant_id }
            | ContributionChange::ParticipantRemove { participant_id } => {
                serde_json::Value::from(participant_id.as_str())
            }
            ContributionChange::Custom { payload, .. } => serde_json::Value::Object(
                payload
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
        }
    }

    /// The attribute key for attribute changes.
    pub fn attribute_key(&self) -> Option<&str> {
        match self {
            ContributionChange::AttributeChange { attribute, .. } => Some(attribute),
            _ => None,
        }
    }

    /// The participant this change names, if any.
    ///
    /// Custom payloads may name one through a `participantId` string entry.
    pub fn supplied_participant(&self) -> Option<UserId> {
        match self {
            ContributionChange::ParticipantAdd { participant_id }
            | ContributionChange::ParticipantRemove { participant_id } => {
                Some(participant_id.clone())
            }
            ContributionChange::Custom { payload, .. } => payload
                .get(PARTICIPANT_ID_KEY)
                .and_then(|v| v.as_str())
                .map(UserId::from),
            _ => None,
        }
    }

    /// Short human-readable description used as a version's change summary.
    pub fn summary(&self) -> String {
        match self {
            ContributionChange::TitleEdit { title } => format!("Changed title to \"{title}\""),
            ContributionChange::DescriptionEdit { .. } => "Updated description".to_string(),
            ContributionChange::StoryEdit { .. } => "Rewrote story".to_string(),
            ContributionChange::StoryAddition { .. } => "Added to story".to_string(),
            ContributionChange::LocationUpdate { location } => match &location.name {
                Some(name) => format!("Moved location to {name}"),
                None => "Updated location".to_string(),
            },
            ContributionChange::AttributeChange { attribute, .. } => {
                format!("Set {attribute}")
            }
            ContributionChange::ParticipantAdd { participant_id } => {
                format!("Added participant {participant_id}")
            }
            ContributionChange::ParticipantRemove { participant_id } => {
                format!("Removed participant {participant_id}")
            }
            ContributionChange::Custom { kind, .. } => format!("Applied {kind}"),
        }
    }
}

/// Approval stamp. Set once; a contribution is terminal after approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Approval {
    pub approved_by: UserId,
    pub approved_at: DateTime<Utc>,
    pub new_version_id: VersionId,
}

/// A proposed change to a shared event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contribution {
    pub id: ContributionId,
    pub event_id: EventId,
    pub contributor_id: UserId,
    pub change: ContributionChange,
    pub timestamp: DateTime<Utc>,
    /// The version that was current when the contribution was submitted.
    pub previous_version_id: Option<VersionId>,
    /// Conflicts recorded against this contribution at submission.
    pub conflicts_with: Vec<ConflictId>,
    pub approval: Option<Approval>,
}

impl Contribution {
    pub fn contribution_type(&self) -> ContributionType {
        self.change.contribution_type()
    }

    pub fn is_approved(&self) -> bool {
        self.approval.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.approval.is_none()
    }
}
