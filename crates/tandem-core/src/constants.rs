/// Tandem engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mean earth radius used by the spherical distance approximation, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Attribute key whose concurrent edits are treated as integrity conflicts.
pub const PRIVACY_LEVEL_ATTRIBUTE: &str = "privacyLevel";

/// Payload key a custom contribution uses to name a participant.
pub const PARTICIPANT_ID_KEY: &str = "participantId";

/// Change summary recorded on a synthesized baseline version.
pub const BASELINE_CHANGE_SUMMARY: &str = "Initial version";

/// Id prefixes handed to the id generator.
pub const CONTRIBUTION_ID_PREFIX: &str = "contrib";
pub const VERSION_ID_PREFIX: &str = "ver";
pub const CONFLICT_ID_PREFIX: &str = "conflict";
pub const SESSION_ID_PREFIX: &str = "session";
pub const EVENT_ID_PREFIX: &str = "event";
