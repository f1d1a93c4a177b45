//! Single-signal detectors and the trait they share.

mod facial;
mod spatial;
mod temporal;

pub use facial::{FacialDetector, SignatureFlagProvider};
pub use spatial::SpatialDetector;
pub use temporal::TemporalDetector;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tandem_core::constants::EARTH_RADIUS_M;
use tandem_core::models::{
    DetectionFactor, DetectionMetadata, DetectionType, EventPoint, SharedEventMatch,
};

use crate::geo::haversine_with_radius;

/// Inputs shared by every detector in one detection run.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext {
    pub detected_at: DateTime<Utc>,
    pub earth_radius_m: f64,
}

impl DetectionContext {
    pub fn new(detected_at: DateTime<Utc>) -> Self {
        Self {
            detected_at,
            earth_radius_m: EARTH_RADIUS_M,
        }
    }
}

/// A detector's verdict for one event pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalScore {
    pub confidence: f64,
    /// Contributing signals. Single-signal detectors report themselves.
    pub factors: Vec<DetectionFactor>,
}

impl SignalScore {
    pub fn single(signal: DetectionType, confidence: f64) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            confidence,
            factors: vec![DetectionFactor { signal, confidence }],
        }
    }
}

/// A scorer over (user event, peer event) pairs.
pub trait SignalDetector: Send + Sync {
    fn detection_type(&self) -> DetectionType;

    /// Score one pair. `None` means the signal did not fire.
    fn score(&self, user_event: &EventPoint, peer_event: &EventPoint) -> Option<SignalScore>;

    /// Score every cross-owner pair, in parallel over user events.
    ///
    /// Output order is user-event order, then peer-event order.
    fn detect(
        &self,
        user_events: &[EventPoint],
        peer_events: &[EventPoint],
        ctx: &DetectionContext,
    ) -> Vec<SharedEventMatch> {
        user_events
            .par_iter()
            .flat_map_iter(|user_event| {
                peer_events
                    .iter()
                    .filter(move |peer_event| peer_event.owner_id != user_event.owner_id)
                    .filter_map(move |peer_event| {
                        self.score(user_event, peer_event).map(|score| {
                            build_match(self.detection_type(), user_event, peer_event, score, ctx)
                        })
                    })
            })
            .collect()
    }
}

/// Absolute time difference in minutes.
pub(crate) fn minutes_apart(a: &EventPoint, b: &EventPoint) -> f64 {
    (a.timestamp - b.timestamp).num_milliseconds().unsigned_abs() as f64 / 60_000.0
}

/// Distance in meters when both events carry coordinates.
pub(crate) fn meters_apart(a: &EventPoint, b: &EventPoint, earth_radius_m: f64) -> Option<f64> {
    match (a.location, b.location) {
        (Some(la), Some(lb)) => Some(haversine_with_radius(la, lb, earth_radius_m)),
        _ => None,
    }
}

pub(crate) fn build_match(
    detection_type: DetectionType,
    user_event: &EventPoint,
    peer_event: &EventPoint,
    score: SignalScore,
    ctx: &DetectionContext,
) -> SharedEventMatch {
    SharedEventMatch {
        id: SharedEventMatch::derive_id(detection_type, &user_event.id, &peer_event.id),
        participant_ids: vec![user_event.owner_id.clone(), peer_event.owner_id.clone()],
        reference_event_id: user_event.id.clone(),
        detected_at: ctx.detected_at,
        confidence_score: score.confidence.clamp(0.0, 1.0),
        detection_type,
        detection_metadata: DetectionMetadata {
            peer_event_id: peer_event.id.clone(),
            time_delta_minutes: minutes_apart(user_event, peer_event),
            distance_m: meters_apart(user_event, peer_event, ctx.earth_radius_m),
            factors: score.factors,
        },
    }
}
