//! Configuration.
//!
//! # Examples
//!
//! ```
//! use tandem_core::config::{ApprovalPolicy, TandemConfig};
//!
//! let config = TandemConfig::from_toml(
//!     r#"
//! [collab]
//! approval_policy = "owner_only"
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.collab.approval_policy, ApprovalPolicy::OwnerOnly);
//! assert_eq!(config.detection.spatial_radius_m, 100.0);
//! ```

mod collab_config;
pub mod defaults;
mod detection_config;
mod observability_config;

pub use collab_config::{ApprovalPolicy, CollabConfig};
pub use detection_config::{DetectionConfig, HybridWeights};
pub use observability_config::ObservabilityConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{TandemError, TandemResult};

/// Root configuration for the whole engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TandemConfig {
    pub detection: DetectionConfig,
    pub collab: CollabConfig,
    pub observability: ObservabilityConfig,
}

impl TandemConfig {
    /// Parse from TOML. Missing sections and fields take their defaults.
    pub fn from_toml(source: &str) -> TandemResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| TandemError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TandemResult<()> {
        self.detection.validate()?;
        if self.collab.notification_capacity == 0 {
            return Err(TandemError::ConfigError(
                "collab.notification_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
