// Single source of truth for all default values.

// --- Detection: single signals ---
pub const DEFAULT_TEMPORAL_WINDOW_MINUTES: f64 = 60.0;
pub const DEFAULT_TEMPORAL_FLOOR: f64 = 0.6;
pub const DEFAULT_SPATIAL_RADIUS_M: f64 = 100.0;
pub const DEFAULT_FACIAL_CONFIDENCE: f64 = 0.85;

// --- Detection: hybrid ---
pub const DEFAULT_HYBRID_TEMPORAL_WINDOW_MINUTES: f64 = 120.0;
pub const DEFAULT_HYBRID_SPATIAL_RADIUS_M: f64 = 200.0;
pub const DEFAULT_HYBRID_TEMPORAL_WEIGHT: f64 = 0.4;
pub const DEFAULT_HYBRID_SPATIAL_WEIGHT: f64 = 0.4;
pub const DEFAULT_HYBRID_FACIAL_WEIGHT: f64 = 0.2;
pub const DEFAULT_HYBRID_MIN_SIGNALS: usize = 2;
pub const DEFAULT_HYBRID_MIN_SCORE: f64 = 0.6;

// --- Detection: output ---
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

// --- Collaboration ---
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 1800; // 30 minutes

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
