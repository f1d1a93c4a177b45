//! # tandem-core
//!
//! Foundation crate for the Tandem shared-timeline engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::TandemConfig;
pub use errors::{CollabError, DetectionError, TandemError, TandemResult};
pub use models::ids::{
    ConflictId, ContributionId, EventId, MatchId, SessionId, UserId, VersionId,
};
