/// Input validation errors for shared-event detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// Coordinates out of range, non-finite, or only one of the pair present.
    #[error("invalid coordinates: lat={lat:?}, lon={lon:?}")]
    InvalidCoordinates { lat: Option<f64>, lon: Option<f64> },

    #[error("invalid detection config: {reason}")]
    InvalidConfig { reason: String },
}
