//! # tandem-collab
//!
//! Multi-party editing of shared events.
//!
//! Participants propose changes as contributions, which wait in a per-event
//! ledger until approved. Concurrent edits to the same field (or edits that
//! would break event integrity) are recorded as conflicts and block approval
//! until resolved. Each approval yields a new version in the event's chain
//! and credits its contributor. Presence sessions and a notification stream
//! of committed records round it out.
//!
//! [`CollaborationEngine`] is the entry point.

pub mod attribution;
pub mod conflict;
pub mod engine;
pub mod ledger;
pub mod notifications;
pub mod permissions;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod state;
pub mod version_chain;

pub use attribution::AttributionTracker;
pub use conflict::{ConflictCandidate, ConflictDetector};
pub use engine::{CollaborationEngine, EngineBuilder};
pub use ledger::ContributionLedger;
pub use notifications::{EventStream, NotificationHub};
pub use permissions::PermissionGate;
pub use registry::SharedEventRegistry;
pub use resolver::{ConflictResolver, ResolutionOutcome};
pub use session::SessionManager;
pub use version_chain::{apply_change, VersionAuthor, VersionChain};
