pub mod attribution;
pub mod conflict;
pub mod contribution;
pub mod event_point;
pub mod ids;
pub mod notification;
pub mod permission;
pub mod session;
pub mod shared_event;
pub mod shared_event_match;
pub mod version;

pub use attribution::{ContentAttribution, ContributorCredit};
pub use conflict::{ConflictStatus, ConflictType, EditConflict, ResolutionStrategy};
pub use contribution::{
    Approval, Contribution, ContributionChange, ContributionType, EventLocation,
};
pub use event_point::{EventPoint, GeoPoint};
pub use notification::{MutationRecord, Notification, RecordKind};
pub use permission::{DateScope, PermissionScope};
pub use session::{CollaborativeSession, SessionStatus};
pub use shared_event::{EventLifecycle, SharedEvent};
pub use shared_event_match::{
    CoverageKey, DetectionFactor, DetectionMetadata, DetectionType, SharedEventMatch,
};
pub use version::{EventData, EventVersion};
