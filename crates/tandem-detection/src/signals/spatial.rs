use tandem_core::config::DetectionConfig;
use tandem_core::models::{DetectionType, EventPoint};

use super::{meters_apart, SignalDetector, SignalScore};

/// Fires when both events carry coordinates within `radius_m` of each other.
#[derive(Debug, Clone)]
pub struct SpatialDetector {
    radius_m: f64,
    earth_radius_m: f64,
}

impl SpatialDetector {
    pub fn new(radius_m: f64, earth_radius_m: f64) -> Self {
        Self {
            radius_m,
            earth_radius_m,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.spatial_radius_m, config.earth_radius_m)
    }

    /// Confidence for a given distance, or `None` beyond the radius.
    pub fn confidence_for(&self, distance_m: f64) -> Option<f64> {
        (distance_m <= self.radius_m).then(|| 1.0 - distance_m / self.radius_m)
    }
}

impl Default for SpatialDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl SignalDetector for SpatialDetector {
    fn detection_type(&self) -> DetectionType {
        DetectionType::Spatial
    }

    fn score(&self, user_event: &EventPoint, peer_event: &EventPoint) -> Option<SignalScore> {
        let distance = meters_apart(user_event, peer_event, self.earth_radius_m)?;
        self.confidence_for(distance)
            .map(|confidence| SignalScore::single(DetectionType::Spatial, confidence))
    }
}
