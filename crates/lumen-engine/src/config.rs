//! Engine configuration
//!
//! One YAML document carries every section. Missing sections and fields
//! fall back to their defaults.
//!
//! ```yaml
//! log_level: info
//! trend:
//!   min_forecast_samples: 7
//! alerts:
//!   gate:
//!     high_interval_hours: 24
//! audit:
//!   allowed_variance: 5.0
//! cache:
//!   ttl_secs: 300
//! ```

use lumen_alerts::AlertConfig;
use lumen_audit::AuditConfig;
use lumen_core::{CacheConfig, LumenError, Result};
use lumen_trend::TrendConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    pub trend: TrendConfig,
    pub alerts: AlertConfig,
    pub audit: AuditConfig,
    pub cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            trend: TrendConfig::default(),
            alerts: AlertConfig::default(),
            audit: AuditConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LumenError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| LumenError::Config(format!("unknown log_level '{}'", self.log_level)))?;
        self.trend
            .validate()
            .map_err(|e| LumenError::Config(format!("trend: {}", e)))?;
        self.alerts
            .validate()
            .map_err(|e| LumenError::Config(format!("alerts: {}", e)))?;
        self.audit
            .validate()
            .map_err(|e| LumenError::Config(format!("audit: {}", e)))?;
        if self.cache.enabled && (self.cache.ttl_secs == 0 || self.cache.max_entries == 0) {
            return Err(LumenError::Config(
                "cache: ttl_secs and max_entries must be positive when enabled".to_string(),
            ));
        }
        Ok(())
    }
}
