//! Orchestrates the signal detectors into one de-duplicated result set.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use tandem_core::config::DetectionConfig;
use tandem_core::models::{CoverageKey, EventPoint, SharedEventMatch};
use tandem_core::traits::{Clock, FaceSignalProvider, RelationshipProvider, SystemClock};
use tandem_core::{DetectionError, UserId};
use tandem_observability::events;

use crate::hybrid::HybridDetector;
use crate::signals::{
    DetectionContext, FacialDetector, SignalDetector, SignatureFlagProvider, SpatialDetector,
    TemporalDetector,
};

/// Runs temporal, spatial, facial, then hybrid detection.
///
/// A participant pair is covered once any earlier signal matched it, on any
/// of their events. Spatial matches for a pair covered by temporal are
/// dropped and facial matches are always kept. Hybrid matches for a pair
/// covered by anything earlier are dropped. The union is then filtered by
/// `min_confidence`.
pub struct SharedEventDetector {
    temporal: TemporalDetector,
    spatial: SpatialDetector,
    facial: FacialDetector,
    hybrid: HybridDetector,
    min_confidence: f64,
    earth_radius_m: f64,
    clock: Arc<dyn Clock>,
}

impl SharedEventDetector {
    /// Build from a validated config, the default face provider and the system clock.
    pub fn new(config: DetectionConfig) -> Result<Self, DetectionError> {
        Self::with_providers(
            config,
            Arc::new(SignatureFlagProvider::default()),
            Arc::new(SystemClock),
        )
    }

    pub fn with_providers(
        config: DetectionConfig,
        face_provider: Arc<dyn FaceSignalProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DetectionError> {
        config.validate()?;
        Ok(Self {
            temporal: TemporalDetector::from_config(&config),
            spatial: SpatialDetector::from_config(&config),
            facial: FacialDetector::new(face_provider.clone()),
            hybrid: HybridDetector::from_config(&config, face_provider),
            min_confidence: config.min_confidence,
            earth_radius_m: config.earth_radius_m,
            clock,
        })
    }

    /// Detect shared events between one user's events and a peer's events.
    pub fn detect(
        &self,
        user_events: &[EventPoint],
        peer_events: &[EventPoint],
    ) -> Vec<SharedEventMatch> {
        let ctx = self.context();
        let user = owner_label(user_events);
        let peer = owner_label(peer_events);
        let span = tandem_observability::detection_span!(user, peer);
        let _guard = span.enter();
        self.detect_with(user_events, peer_events, &ctx, &user, &peer)
    }

    /// Run [`detect`](Self::detect) for every actively connected pair of users.
    ///
    /// Pairs are processed in parallel; results are concatenated in sorted
    /// user-pair order.
    pub fn detect_connected(
        &self,
        timelines: &BTreeMap<UserId, Vec<EventPoint>>,
        relationships: &dyn RelationshipProvider,
    ) -> Vec<SharedEventMatch> {
        let ctx = self.context();
        let users: Vec<&UserId> = timelines.keys().collect();
        let mut pairs = Vec::new();
        for (i, a) in users.iter().enumerate() {
            for b in &users[i + 1..] {
                if relationships.is_active_connection(a, b) {
                    pairs.push((*a, *b));
                }
            }
        }
        debug!(users = users.len(), pairs = pairs.len(), "batch detection");

        let per_pair: Vec<Vec<SharedEventMatch>> = pairs
            .par_iter()
            .map(|(a, b)| match (timelines.get(*a), timelines.get(*b)) {
                (Some(user_events), Some(peer_events)) => {
                    self.detect_with(user_events, peer_events, &ctx, a.as_str(), b.as_str())
                }
                _ => Vec::new(),
            })
            .collect();
        per_pair.into_iter().flatten().collect()
    }

    fn context(&self) -> DetectionContext {
        DetectionContext {
            detected_at: self.clock.now(),
            earth_radius_m: self.earth_radius_m,
        }
    }

    fn detect_with(
        &self,
        user_events: &[EventPoint],
        peer_events: &[EventPoint],
        ctx: &DetectionContext,
        user: &str,
        peer: &str,
    ) -> Vec<SharedEventMatch> {
        let temporal = self.temporal.detect(user_events, peer_events, ctx);
        let mut covered: HashSet<CoverageKey> =
            temporal.iter().map(SharedEventMatch::coverage_key).collect();

        let spatial: Vec<SharedEventMatch> = self
            .spatial
            .detect(user_events, peer_events, ctx)
            .into_iter()
            .filter(|m| !covered.contains(&m.coverage_key()))
            .collect();
        covered.extend(spatial.iter().map(SharedEventMatch::coverage_key));

        let facial = self.facial.detect(user_events, peer_events, ctx);
        covered.extend(facial.iter().map(SharedEventMatch::coverage_key));

        let hybrid: Vec<SharedEventMatch> = self
            .hybrid
            .detect(user_events, peer_events, ctx)
            .into_iter()
            .filter(|m| !covered.contains(&m.coverage_key()))
            .collect();

        let candidates = temporal.len() + spatial.len() + facial.len() + hybrid.len();
        let kept: Vec<SharedEventMatch> = temporal
            .into_iter()
            .chain(spatial)
            .chain(facial)
            .chain(hybrid)
            .filter(|m| m.confidence_score >= self.min_confidence)
            .collect();

        events::shared_events_detected(user, peer, candidates, kept.len());
        kept
    }
}

impl Default for SharedEventDetector {
    fn default() -> Self {
        let config = DetectionConfig::default();
        Self {
            temporal: TemporalDetector::from_config(&config),
            spatial: SpatialDetector::from_config(&config),
            facial: FacialDetector::default(),
            hybrid: HybridDetector::default(),
            min_confidence: config.min_confidence,
            earth_radius_m: config.earth_radius_m,
            clock: Arc::new(SystemClock),
        }
    }
}

/// The single owner of a timeline slice, or `"mixed"`.
fn owner_label(events: &[EventPoint]) -> String {
    match events.first() {
        Some(first) if events.iter().all(|e| e.owner_id == first.owner_id) => {
            first.owner_id.to_string()
        }
        Some(_) => "mixed".to_string(),
        None => "none".to_string(),
    }
}
