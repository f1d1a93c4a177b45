//! Detected shared-event candidates.
//!
//! A match is produced by detection, never mutated, and is either promoted to
//! a [`SharedEvent`](super::shared_event::SharedEvent) or discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{EventId, MatchId, UserId};

/// Which signal produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DetectionType {
    Temporal,
    Spatial,
    Facial,
    Hybrid,
}

impl DetectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionType::Temporal => "temporal",
            DetectionType::Spatial => "spatial",
            DetectionType::Facial => "facial",
            DetectionType::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for DetectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signal's contribution to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetectionFactor {
    pub signal: DetectionType,
    /// The signal's own confidence, before weighting.
    pub confidence: f64,
}

/// Explainability data attached to every match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetectionMetadata {
    /// The peer-side event paired with the reference event.
    pub peer_event_id: EventId,
    /// Absolute time difference between the two events, in minutes.
    pub time_delta_minutes: f64,
    /// Great-circle distance in meters, when both events carry coordinates.
    pub distance_m: Option<f64>,
    /// Signals that fired for this pair. Single-signal matches carry one entry.
    pub factors: Vec<DetectionFactor>,
}

/// A candidate event two (or more) users likely both attended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SharedEventMatch {
    pub id: MatchId,
    /// Unique participants; the reference event's owner comes first.
    pub participant_ids: Vec<UserId>,
    /// The requesting user's event the match is anchored on.
    pub reference_event_id: EventId,
    pub detected_at: DateTime<Utc>,
    /// Always within `[0.0, 1.0]`.
    pub confidence_score: f64,
    pub detection_type: DetectionType,
    pub detection_metadata: DetectionMetadata,
}

/// The unordered participant set a match covers, used for de-duplication
/// across signals. Which events were paired plays no part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoverageKey {
    /// Participants sorted ascending.
    pub participants: Vec<UserId>,
}

impl SharedEventMatch {
    /// Deterministic match id: blake3 over the detection type and the event pair.
    pub fn derive_id(
        detection_type: DetectionType,
        reference_event_id: &EventId,
        peer_event_id: &EventId,
    ) -> MatchId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(detection_type.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(reference_event_id.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(peer_event_id.as_str().as_bytes());
        let hex = hasher.finalize().to_hex();
        MatchId(format!("match-{}", &hex.as_str()[..24]))
    }

    /// The key used to decide whether another signal already covers this participant pair.
    pub fn coverage_key(&self) -> CoverageKey {
        let mut participants = self.participant_ids.clone();
        participants.sort();
        CoverageKey { participants }
    }

    /// The signals that contributed to this match.
    pub fn factor_signals(&self) -> Vec<DetectionType> {
        self.detection_metadata
            .factors
            .iter()
            .map(|f| f.signal)
            .collect()
    }
}
