use std::sync::Arc;

use tandem_core::config::DetectionConfig;
use tandem_core::models::{DetectionType, EventPoint};
use tandem_core::traits::FaceSignalProvider;

use super::{SignalDetector, SignalScore};

/// Default face provider: both events flagged with a signature → fixed score.
///
/// Performs no inference; the flags are computed upstream.
#[derive(Debug, Clone)]
pub struct SignatureFlagProvider {
    confidence: f64,
}

impl SignatureFlagProvider {
    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }
}

impl Default for SignatureFlagProvider {
    fn default() -> Self {
        Self::new(DetectionConfig::default().facial_confidence)
    }
}

impl FaceSignalProvider for SignatureFlagProvider {
    fn face_score(&self, a: &EventPoint, b: &EventPoint) -> Option<f64> {
        match (a.has_face_signature, b.has_face_signature) {
            (Some(true), Some(true)) => Some(self.confidence),
            _ => None,
        }
    }
}

/// Fires when both events carry a face flag and the provider returns a score.
#[derive(Clone)]
pub struct FacialDetector {
    provider: Arc<dyn FaceSignalProvider>,
}

impl FacialDetector {
    pub fn new(provider: Arc<dyn FaceSignalProvider>) -> Self {
        Self { provider }
    }

    /// Provider score for a pair, only when both carry a face flag.
    pub(crate) fn face_score(
        provider: &dyn FaceSignalProvider,
        a: &EventPoint,
        b: &EventPoint,
    ) -> Option<f64> {
        if a.has_face_signature.is_none() || b.has_face_signature.is_none() {
            return None;
        }
        provider
            .face_score(a, b)
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0))
    }
}

impl std::fmt::Debug for FacialDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacialDetector").finish_non_exhaustive()
    }
}

impl Default for FacialDetector {
    fn default() -> Self {
        Self::new(Arc::new(SignatureFlagProvider::default()))
    }
}

impl SignalDetector for FacialDetector {
    fn detection_type(&self) -> DetectionType {
        DetectionType::Facial
    }

    fn score(&self, user_event: &EventPoint, peer_event: &EventPoint) -> Option<SignalScore> {
        Self::face_score(self.provider.as_ref(), user_event, peer_event)
            .map(|confidence| SignalScore::single(DetectionType::Facial, confidence))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn both_flags_true_yields_the_fixed_score() {
        let now = Utc::now();
        let a = EventPoint::new("a", "alice", now).with_face_signature(true);
        let b = EventPoint::new("b", "bob", now).with_face_signature(true);
        let score = FacialDetector::default().score(&a, &b).unwrap();
        assert_eq!(score.confidence, 0.85);
    }

    #[test]
    fn missing_or_false_flags_do_not_fire() {
        let now = Utc::now();
        let flagged = EventPoint::new("a", "alice", now).with_face_signature(true);
        let unflagged = EventPoint::new("b", "bob", now);
        let negative = EventPoint::new("c", "bob", now).with_face_signature(false);
        let detector = FacialDetector::default();
        assert!(detector.score(&flagged, &unflagged).is_none());
        assert!(detector.score(&flagged, &negative).is_none());
    }
}
