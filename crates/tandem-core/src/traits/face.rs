use crate::models::event_point::EventPoint;

/// Pluggable facial-match signal.
///
/// Face recognition runs outside the engine; providers only report a
/// precomputed score for a pair of events, or `None` when there is no facial
/// evidence either way.
pub trait FaceSignalProvider: Send + Sync {
    fn face_score(&self, a: &EventPoint, b: &EventPoint) -> Option<f64>;
}
