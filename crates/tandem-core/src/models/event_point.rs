//! Timeline events used as detection input.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tandem_core::models::event_point::{EventPoint, GeoPoint};
//!
//! let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
//! let event = EventPoint::new("e-1", "alice", at)
//!     .with_location(GeoPoint::new(40.0, -74.0).unwrap())
//!     .with_face_signature(true);
//! assert!(event.location.is_some());
//!
//! // Coordinates are both-or-neither.
//! assert!(EventPoint::new("e-2", "bob", at)
//!     .with_coordinates(Some(40.0), None)
//!     .is_err());
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{EventId, UserId};
use crate::errors::DetectionError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Build a validated point. Latitude must lie in [-90, 90] and longitude
    /// in [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, DetectionError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(DetectionError::InvalidCoordinates {
                lat: Some(lat),
                lon: Some(lon),
            });
        }
        Ok(Self { lat, lon })
    }
}

/// A single user's timeline event.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventPoint {
    pub id: EventId,
    /// The user whose timeline holds this event.
    pub owner_id: UserId,
    pub timestamp: DateTime<Utc>,
    /// Where the event happened, if known.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Precomputed by an external face pipeline; `None` means not analysed.
    #[serde(default)]
    pub has_face_signature: Option<bool>,
    /// Opaque attributes carried through from the source timeline.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EventPoint {
    pub fn new(
        id: impl Into<EventId>,
        owner_id: impl Into<UserId>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            timestamp,
            location: None,
            has_face_signature: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach raw coordinates. Both must be present or both absent.
    pub fn with_coordinates(
        mut self,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, DetectionError> {
        self.location = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)?),
            (None, None) => None,
            (lat, lon) => return Err(DetectionError::InvalidCoordinates { lat, lon }),
        };
        Ok(self)
    }

    pub fn with_face_signature(mut self, has_signature: bool) -> Self {
        self.has_face_signature = Some(has_signature);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}
