//! Test doubles and fixture loaders shared by the Tandem crates.
//!
//! Provides deterministic stand-ins for the engine's external collaborators
//! (clock, id generator, relationship graph, merge function) plus typed
//! loading of the JSON timelines under `timelines/`.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::DeserializeOwned;
use tandem_core::models::{EventLifecycle, EventPoint, GeoPoint, PermissionScope, SharedEvent};
use tandem_core::traits::{Clock, FieldMergeFunction, IdGenerator, RelationshipProvider};
use tandem_core::{CollabError, TandemResult, UserId};

// ── Fixture loading ─────────────────────────────────────────────────────────

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a named timeline from `timelines/<name>.json`.
pub fn load_timeline(name: &str) -> Vec<EventPoint> {
    load_fixture(&format!("timelines/{name}.json"))
}

// ── Event builders ──────────────────────────────────────────────────────────

/// 2024-06-01 at the given UTC wall time.
pub fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, second)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture time {hour}:{minute}:{second}"))
}

/// An event with a timestamp only.
pub fn event(id: &str, owner: &str, timestamp: DateTime<Utc>) -> EventPoint {
    EventPoint::new(id, owner, timestamp)
}

/// An event with a timestamp and coordinates.
pub fn located_event(
    id: &str,
    owner: &str,
    timestamp: DateTime<Utc>,
    lat: f64,
    lon: f64,
) -> EventPoint {
    let location = GeoPoint::new(lat, lon)
        .unwrap_or_else(|e| panic!("invalid fixture coordinates: {e}"));
    EventPoint::new(id, owner, timestamp).with_location(location)
}

/// An active shared event created at `occurred_at`. The first participant owns it.
pub fn shared_event(id: &str, participants: &[&str], occurred_at: DateTime<Utc>) -> SharedEvent {
    let participant_ids: Vec<UserId> = participants.iter().map(|p| UserId::from(*p)).collect();
    SharedEvent {
        id: id.into(),
        owner_id: participant_ids
            .first()
            .cloned()
            .unwrap_or_else(|| panic!("shared event {id} needs a participant")),
        participant_ids,
        occurred_at,
        lifecycle: EventLifecycle::Active,
        original_event_id: None,
        source_match_id: None,
        created_at: occurred_at,
    }
}

// ── Clock ───────────────────────────────────────────────────────────────────

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(at(10, 0, 0))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── Ids ─────────────────────────────────────────────────────────────────────

/// Generates `<prefix>-1`, `<prefix>-2`, ... with one counter shared by all prefixes.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }
}

// ── Relationships ───────────────────────────────────────────────────────────

/// An in-memory relationship graph.
///
/// Connections are undirected; permission scopes are directed
/// (grantor → grantee).
#[derive(Debug, Default)]
pub struct InMemoryRelationships {
    connections: RwLock<HashSet<(UserId, UserId)>>,
    scopes: RwLock<HashMap<(UserId, UserId), PermissionScope>>,
    names: RwLock<HashMap<UserId, String>>,
}

fn pair(a: &UserId, b: &UserId) -> (UserId, UserId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl InMemoryRelationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect two users, each granting the other full edit rights.
    pub fn connect(&self, a: &str, b: &str) -> &Self {
        let (a, b) = (UserId::from(a), UserId::from(b));
        self.connections.write().unwrap().insert(pair(&a, &b));
        let mut scopes = self.scopes.write().unwrap();
        scopes.insert((a.clone(), b.clone()), PermissionScope::full());
        scopes.insert((b, a), PermissionScope::full());
        self
    }

    /// Connect two users and set what `grantor` grants `grantee`.
    pub fn connect_with_scope(&self, grantor: &str, grantee: &str, scope: PermissionScope) -> &Self {
        let (grantor, grantee) = (UserId::from(grantor), UserId::from(grantee));
        self.connections
            .write()
            .unwrap()
            .insert(pair(&grantor, &grantee));
        self.scopes.write().unwrap().insert((grantor, grantee), scope);
        self
    }

    /// Deactivate a connection. Granted scopes are kept but no longer apply.
    pub fn disconnect(&self, a: &str, b: &str) -> &Self {
        let (a, b) = (UserId::from(a), UserId::from(b));
        self.connections.write().unwrap().remove(&pair(&a, &b));
        self
    }

    pub fn set_display_name(&self, user: &str, name: &str) -> &Self {
        self.names
            .write()
            .unwrap()
            .insert(UserId::from(user), name.to_string());
        self
    }
}

impl RelationshipProvider for InMemoryRelationships {
    fn is_active_connection(&self, a: &UserId, b: &UserId) -> bool {
        self.connections.read().unwrap().contains(&pair(a, b))
    }

    fn permission_scope(&self, grantor: &UserId, grantee: &UserId) -> Option<PermissionScope> {
        self.scopes
            .read()
            .unwrap()
            .get(&(grantor.clone(), grantee.clone()))
            .cloned()
    }

    fn display_name(&self, user: &UserId) -> Option<String> {
        self.names.read().unwrap().get(user).cloned()
    }
}

// ── Merge ───────────────────────────────────────────────────────────────────

/// A merge function with scripted behavior.
///
/// `joining` concatenates string values with a separator and lets the right
/// side win for anything else; `failing` always reports `MergeFailed`.
#[derive(Debug)]
pub struct ScriptedMerge {
    separator: Option<String>,
    reason: String,
    calls: AtomicUsize,
}

impl ScriptedMerge {
    pub fn joining(separator: &str) -> Self {
        Self {
            separator: Some(separator.to_string()),
            reason: String::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            separator: None,
            reason: reason.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `merge` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FieldMergeFunction for ScriptedMerge {
    fn merge(
        &self,
        field_key: &str,
        a: &serde_json::Value,
        b: &serde_json::Value,
    ) -> TandemResult<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(separator) = &self.separator else {
            return Err(CollabError::MergeFailed {
                field: field_key.to_string(),
                reason: self.reason.clone(),
            }
            .into());
        };
        match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => Ok(serde_json::Value::from(format!("{a}{separator}{b}"))),
            _ => Ok(b.clone()),
        }
    }
}
