//! TOML-based dashboard configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::grid::metrics::Thresholds;

/// Top-level configuration parsed from TOML.
///
/// Every section is optional and defaults to the reference dashboard
/// behaviour. Load with [`DashboardConfig::from_toml_file`] or use
/// [`DashboardConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Severity and device-status thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
    /// HTTP API settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Terminal UI settings.
    #[serde(default)]
    pub tui: TuiConfig,
    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuiConfig {
    /// Input poll interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

/// Log filter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gridwatch=info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"thresholds.load_max"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl DashboardConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let t = &self.thresholds;

        for (field, value) in [
            ("thresholds.avg_stability_min", t.avg_stability_min),
            ("thresholds.tau_std_dev_max", t.tau_std_dev_max),
            ("thresholds.load_max", t.load_max),
            ("thresholds.device_warning_load", t.device_warning_load),
            ("thresholds.device_load_scale", t.device_load_scale),
        ] {
            if !value.is_finite() {
                errors.push(ConfigError::new(field, "must be finite"));
            }
        }
        if t.tau_std_dev_max <= 0.0 {
            errors.push(ConfigError::new("thresholds.tau_std_dev_max", "must be > 0"));
        }
        if t.device_warning_load < 0.0 {
            errors.push(ConfigError::new(
                "thresholds.device_warning_load",
                "must be >= 0",
            ));
        }
        if t.device_load_scale <= 0.0 {
            errors.push(ConfigError::new("thresholds.device_load_scale", "must be > 0"));
        }
        if t.outage_minutes_per_event == 0 {
            errors.push(ConfigError::new(
                "thresholds.outage_minutes_per_event",
                "must be > 0",
            ));
        }

        let s = &self.server;
        if s.host.trim().is_empty() {
            errors.push(ConfigError::new("server.host", "must not be empty"));
        }
        if s.max_upload_bytes == 0 {
            errors.push(ConfigError::new("server.max_upload_bytes", "must be > 0"));
        }

        if self.tui.tick_ms == 0 {
            errors.push(ConfigError::new("tui.tick_ms", "must be > 0"));
        }

        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigError::new("logging.filter", "must not be empty"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = DashboardConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
        assert_eq!(cfg.thresholds, Thresholds::default());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[thresholds]
avg_stability_min = 0.1
tau_std_dev_max = 3.0
load_max = 800.0
outage_minutes_per_event = 10
device_warning_load = 1.5
device_load_scale = 40.0

[server]
host = "0.0.0.0"
port = 8080
max_upload_bytes = 1048576

[tui]
tick_ms = 50

[logging]
filter = "gridwatch=debug"
"#;
        let cfg = DashboardConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(8080));
        assert_eq!(cfg.as_ref().map(|c| c.thresholds.load_max), Some(800.0));
        assert_eq!(cfg.as_ref().map(|c| c.tui.tick_ms), Some(50));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[thresholds]
load_max = 250.0
"#;
        let cfg = DashboardConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.thresholds.load_max), Some(250.0));
        // untouched threshold keeps its default
        assert_eq!(cfg.as_ref().map(|c| c.thresholds.tau_std_dev_max), Some(2.0));
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(3000));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[server]
port = 3000
bogus_field = true
"#;
        assert!(DashboardConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_scale() {
        let mut cfg = DashboardConfig::default();
        cfg.thresholds.device_load_scale = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.device_load_scale"));
    }

    #[test]
    fn validation_catches_non_finite_threshold() {
        let mut cfg = DashboardConfig::default();
        cfg.thresholds.load_max = f64::INFINITY;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.load_max"));
    }

    #[test]
    fn validation_catches_zero_tick() {
        let mut cfg = DashboardConfig::default();
        cfg.tui.tick_ms = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tui.tick_ms"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = DashboardConfig::from_toml_file(Path::new("/nonexistent/gridwatch.toml"));
        assert!(err.is_err());
        assert!(err.err().map(|e| e.field) == Some("config".to_string()));
    }
}
