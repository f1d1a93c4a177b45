//! # tandem-detection
//!
//! Cross-references two users' timelines and proposes the events they
//! likely attended together.
//!
//! Three independent signal detectors (temporal, spatial, facial) each score
//! event pairs; the hybrid detector combines weaker signals; the
//! [`SharedEventDetector`] runs them in a fixed order, de-duplicates by
//! participant pair, and filters by minimum confidence.

pub mod detector;
pub mod geo;
pub mod hybrid;
pub mod signals;

pub use detector::SharedEventDetector;
pub use geo::haversine_distance_m;
pub use hybrid::HybridDetector;
pub use signals::{
    DetectionContext, FacialDetector, SignalDetector, SignalScore, SignatureFlagProvider,
    SpatialDetector, TemporalDetector,
};
