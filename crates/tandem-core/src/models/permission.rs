//! Relationship permission scopes.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tandem_core::models::permission::{DateScope, PermissionScope};
//!
//! let scope = PermissionScope::full();
//! assert!(scope.allows_edit_at(Utc::now()));
//!
//! let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let to = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
//! let limited = PermissionScope {
//!     date_scope: DateScope::Between { from, to },
//!     ..PermissionScope::full()
//! };
//! assert!(!limited.allows_edit_at(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which event dates a connection's grant applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DateScope {
    All,
    Between {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    None,
}

impl DateScope {
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        match self {
            DateScope::All => true,
            DateScope::Between { from, to } => *from <= at && at <= *to,
            DateScope::None => false,
        }
    }
}

/// What one user grants another through their connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PermissionScope {
    pub can_edit_shared_events: bool,
    pub can_view_private_events: bool,
    pub date_scope: DateScope,
}

impl PermissionScope {
    /// Everything allowed, for every date.
    pub fn full() -> Self {
        Self {
            can_edit_shared_events: true,
            can_view_private_events: true,
            date_scope: DateScope::All,
        }
    }

    /// View-only access.
    pub fn read_only() -> Self {
        Self {
            can_edit_shared_events: false,
            can_view_private_events: true,
            date_scope: DateScope::All,
        }
    }

    pub fn allows_edit_at(&self, at: DateTime<Utc>) -> bool {
        self.can_edit_shared_events && self.date_scope.covers(at)
    }
}
