use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::EARTH_RADIUS_M;
use crate::errors::DetectionError;

/// Relative weights of the hybrid detector's sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub temporal: f64,
    pub spatial: f64,
    pub facial: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            temporal: defaults::DEFAULT_HYBRID_TEMPORAL_WEIGHT,
            spatial: defaults::DEFAULT_HYBRID_SPATIAL_WEIGHT,
            facial: defaults::DEFAULT_HYBRID_FACIAL_WEIGHT,
        }
    }
}

/// Shared-event detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum time gap for a temporal match, in minutes.
    pub temporal_window_minutes: f64,
    /// Lowest confidence a temporal match inside the window can have.
    pub temporal_floor: f64,
    /// Maximum distance for a spatial match, in meters.
    pub spatial_radius_m: f64,
    /// Confidence assigned when both events carry a face signature.
    pub facial_confidence: f64,
    /// Relaxed time window used by the hybrid detector, in minutes.
    pub hybrid_temporal_window_minutes: f64,
    /// Relaxed radius used by the hybrid detector, in meters.
    pub hybrid_spatial_radius_m: f64,
    /// Signals that must fire before a hybrid match is considered.
    pub hybrid_min_signals: usize,
    /// Minimum weighted sum for a hybrid match.
    pub hybrid_min_score: f64,
    /// Matches below this confidence are dropped from detector output.
    pub min_confidence: f64,
    /// Sphere radius for great-circle distances, in meters.
    pub earth_radius_m: f64,
    /// Weights applied to the hybrid detector's sub-scores.
    pub hybrid_weights: HybridWeights,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            temporal_window_minutes: defaults::DEFAULT_TEMPORAL_WINDOW_MINUTES,
            temporal_floor: defaults::DEFAULT_TEMPORAL_FLOOR,
            spatial_radius_m: defaults::DEFAULT_SPATIAL_RADIUS_M,
            facial_confidence: defaults::DEFAULT_FACIAL_CONFIDENCE,
            hybrid_temporal_window_minutes: defaults::DEFAULT_HYBRID_TEMPORAL_WINDOW_MINUTES,
            hybrid_spatial_radius_m: defaults::DEFAULT_HYBRID_SPATIAL_RADIUS_M,
            hybrid_min_signals: defaults::DEFAULT_HYBRID_MIN_SIGNALS,
            hybrid_min_score: defaults::DEFAULT_HYBRID_MIN_SCORE,
            min_confidence: defaults::DEFAULT_MIN_CONFIDENCE,
            earth_radius_m: EARTH_RADIUS_M,
            hybrid_weights: HybridWeights::default(),
        }
    }
}

impl DetectionConfig {
    /// Reject windows, weights and thresholds that cannot produce sane scores.
    pub fn validate(&self) -> Result<(), DetectionError> {
        let positive = [
            ("temporal_window_minutes", self.temporal_window_minutes),
            ("spatial_radius_m", self.spatial_radius_m),
            (
                "hybrid_temporal_window_minutes",
                self.hybrid_temporal_window_minutes,
            ),
            ("hybrid_spatial_radius_m", self.hybrid_spatial_radius_m),
            ("earth_radius_m", self.earth_radius_m),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DetectionError::InvalidConfig {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }

        let unit = [
            ("temporal_floor", self.temporal_floor),
            ("facial_confidence", self.facial_confidence),
            ("hybrid_min_score", self.hybrid_min_score),
            ("min_confidence", self.min_confidence),
            ("hybrid_weights.temporal", self.hybrid_weights.temporal),
            ("hybrid_weights.spatial", self.hybrid_weights.spatial),
            ("hybrid_weights.facial", self.hybrid_weights.facial),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectionError::InvalidConfig {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        if self.hybrid_min_signals == 0 || self.hybrid_min_signals > 3 {
            return Err(DetectionError::InvalidConfig {
                reason: format!(
                    "hybrid_min_signals must be 1..=3, got {}",
                    self.hybrid_min_signals
                ),
            });
        }
        Ok(())
    }
}
