//! Weighted combination of weaker signals.

use std::sync::Arc;

use tandem_core::config::{DetectionConfig, HybridWeights};
use tandem_core::models::{DetectionFactor, DetectionType, EventPoint};
use tandem_core::traits::FaceSignalProvider;

use crate::signals::{
    meters_apart, minutes_apart, FacialDetector, SignalDetector, SignalScore,
    SignatureFlagProvider,
};

/// Scores pairs on relaxed windows and emits only when enough signals agree.
///
/// Sub-scores: temporal `1 - Δt/window`, spatial `1 - d/radius`, facial the
/// provider score. The weighted sum is the confidence; it must reach
/// `min_score` with at least `min_signals` signals firing.
#[derive(Clone)]
pub struct HybridDetector {
    temporal_window_minutes: f64,
    spatial_radius_m: f64,
    weights: HybridWeights,
    min_signals: usize,
    min_score: f64,
    earth_radius_m: f64,
    provider: Arc<dyn FaceSignalProvider>,
}

impl HybridDetector {
    pub fn from_config(config: &DetectionConfig, provider: Arc<dyn FaceSignalProvider>) -> Self {
        Self {
            temporal_window_minutes: config.hybrid_temporal_window_minutes,
            spatial_radius_m: config.hybrid_spatial_radius_m,
            weights: config.hybrid_weights.clone(),
            min_signals: config.hybrid_min_signals,
            min_score: config.hybrid_min_score,
            earth_radius_m: config.earth_radius_m,
            provider,
        }
    }

    /// Individual sub-scores that fired for a pair, in temporal, spatial, facial order.
    pub fn factors(&self, a: &EventPoint, b: &EventPoint) -> Vec<DetectionFactor> {
        let mut factors = Vec::with_capacity(3);

        let minutes = minutes_apart(a, b);
        if minutes <= self.temporal_window_minutes {
            factors.push(DetectionFactor {
                signal: DetectionType::Temporal,
                confidence: 1.0 - minutes / self.temporal_window_minutes,
            });
        }

        if let Some(distance) = meters_apart(a, b, self.earth_radius_m) {
            if distance <= self.spatial_radius_m {
                factors.push(DetectionFactor {
                    signal: DetectionType::Spatial,
                    confidence: 1.0 - distance / self.spatial_radius_m,
                });
            }
        }

        if let Some(score) = FacialDetector::face_score(self.provider.as_ref(), a, b) {
            factors.push(DetectionFactor {
                signal: DetectionType::Facial,
                confidence: score,
            });
        }

        factors
    }

    fn weight(&self, signal: DetectionType) -> f64 {
        match signal {
            DetectionType::Temporal => self.weights.temporal,
            DetectionType::Spatial => self.weights.spatial,
            DetectionType::Facial => self.weights.facial,
            DetectionType::Hybrid => 0.0,
        }
    }
}

impl Default for HybridDetector {
    fn default() -> Self {
        Self::from_config(
            &DetectionConfig::default(),
            Arc::new(SignatureFlagProvider::default()),
        )
    }
}

impl std::fmt::Debug for HybridDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridDetector")
            .field("temporal_window_minutes", &self.temporal_window_minutes)
            .field("spatial_radius_m", &self.spatial_radius_m)
            .field("weights", &self.weights)
            .field("min_signals", &self.min_signals)
            .field("min_score", &self.min_score)
            .finish_non_exhaustive()
    }
}

impl SignalDetector for HybridDetector {
    fn detection_type(&self) -> DetectionType {
        DetectionType::Hybrid
    }

    fn score(&self, user_event: &EventPoint, peer_event: &EventPoint) -> Option<SignalScore> {
        let factors = self.factors(user_event, peer_event);
        if factors.len() < self.min_signals {
            return None;
        }
        let weighted: f64 = factors
            .iter()
            .map(|f| self.weight(f.signal) * f.confidence)
            .sum();
        if weighted < self.min_score {
            return None;
        }
        Some(SignalScore {
            confidence: weighted.clamp(0.0, 1.0),
            factors,
        })
    }
}
