//! String-backed identifier newtypes.
//!
//! # Examples
//!
//! ```
//! use tandem_core::models::ids::{EventId, UserId};
//!
//! let user = UserId::from("alice");
//! assert_eq!(user.to_string(), "alice");
//!
//! let event = EventId::new();
//! assert!(!event.as_str().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
        #[ts(export)]
        pub struct $name(pub String);

        impl $name {
            /// Create a fresh identifier backed by a random UUID v4.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// A user whose timeline participates in detection and collaboration.
    UserId
);
string_id!(
    /// A timeline event or shared event.
    EventId
);
string_id!(
    /// A detected shared-event candidate.
    MatchId
);
string_id!(
    /// A proposed edit in the contribution ledger.
    ContributionId
);
string_id!(
    /// An approved snapshot in a version chain.
    VersionId
);
string_id!(
    /// A recorded edit conflict.
    ConflictId
);
string_id!(
    /// A collaborative presence session.
    SessionId
);
