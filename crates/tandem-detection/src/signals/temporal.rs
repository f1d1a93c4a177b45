use tandem_core::config::DetectionConfig;
use tandem_core::models::{DetectionType, EventPoint};

use super::{minutes_apart, SignalDetector, SignalScore};

/// Fires when two events happened within `window_minutes` of each other.
///
/// Confidence falls linearly from 1.0 at zero offset and never drops below
/// `floor` inside the window.
#[derive(Debug, Clone)]
pub struct TemporalDetector {
    window_minutes: f64,
    floor: f64,
}

impl TemporalDetector {
    pub fn new(window_minutes: f64, floor: f64) -> Self {
        Self {
            window_minutes,
            floor,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.temporal_window_minutes, config.temporal_floor)
    }

    /// Confidence for a given offset, or `None` outside the window.
    pub fn confidence_for(&self, minutes: f64) -> Option<f64> {
        if minutes > self.window_minutes {
            return None;
        }
        Some((1.0 - minutes / self.window_minutes).max(self.floor))
    }
}

impl Default for TemporalDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl SignalDetector for TemporalDetector {
    fn detection_type(&self) -> DetectionType {
        DetectionType::Temporal
    }

    fn score(&self, user_event: &EventPoint, peer_event: &EventPoint) -> Option<SignalScore> {
        let minutes = minutes_apart(user_event, peer_event);
        self.confidence_for(minutes)
            .map(|confidence| SignalScore::single(DetectionType::Temporal, confidence))
    }
}
