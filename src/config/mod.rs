//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/disaster-zones/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::zone::{Zone, ZoneClassifier, ZoneThresholds};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Density classification
    #[serde(default)]
    pub zones: ZonesConfig,

    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Spatial index selection
    #[serde(default)]
    pub index: IndexConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Report storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report constraints
    #[serde(default)]
    pub report: ReportConfig,
}

/// Density classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesConfig {
    /// Radius over which density is counted, in meters
    #[serde(default = "default_classification_radius")]
    pub radius_meters: f64,

    #[serde(default = "default_yellow_above")]
    pub yellow_above: usize,

    #[serde(default = "default_orange_above")]
    pub orange_above: usize,

    #[serde(default = "default_red_above")]
    pub red_above: usize,
}

/// Query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Radius of the nearby query, in meters
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_meters: f64,

    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,

    #[serde(default = "default_red_zone_limit")]
    pub red_zone_limit: usize,

    /// Least severe zone the red-zone query returns
    #[serde(default = "default_red_zone_min_zone")]
    pub red_zone_min_zone: String,

    /// Optional radius cap for the red-zone query (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_zone_max_distance_meters: Option<f64>,
}

/// Spatial index selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// "rtree" or "scan"
    #[serde(default = "default_index")]
    pub backend: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Report storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "file" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Reports file for the file backend (XDG data dir when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Upper bound on each repository call, in milliseconds
    #[serde(default = "default_storage_timeout")]
    pub timeout_ms: u64,
}

/// Report constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
}

// Default value functions for serde
fn default_classification_radius() -> f64 {
    DEFAULT_CLASSIFICATION_RADIUS
}
fn default_yellow_above() -> usize {
    DEFAULT_YELLOW_ABOVE
}
fn default_orange_above() -> usize {
    DEFAULT_ORANGE_ABOVE
}
fn default_red_above() -> usize {
    DEFAULT_RED_ABOVE
}
fn default_nearby_radius() -> f64 {
    DEFAULT_NEARBY_RADIUS
}
fn default_nearby_limit() -> usize {
    DEFAULT_NEARBY_LIMIT
}
fn default_red_zone_limit() -> usize {
    DEFAULT_RED_ZONE_LIMIT
}
fn default_red_zone_min_zone() -> String {
    DEFAULT_RED_ZONE_MIN_ZONE.to_string()
}
fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_storage_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}
fn default_storage_timeout() -> u64 {
    DEFAULT_STORAGE_TIMEOUT_MS
}
fn default_max_description_chars() -> usize {
    DEFAULT_MAX_DESCRIPTION_CHARS
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_classification_radius(),
            yellow_above: default_yellow_above(),
            orange_above: default_orange_above(),
            red_above: default_red_above(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            nearby_radius_meters: default_nearby_radius(),
            nearby_limit: default_nearby_limit(),
            red_zone_limit: default_red_zone_limit(),
            red_zone_min_zone: default_red_zone_min_zone(),
            red_zone_max_distance_meters: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_index(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
            timeout_ms: default_storage_timeout(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_description_chars: default_max_description_chars(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            let config: Config = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.classifier()?;
        self.red_zone_min_zone()?;

        let radius = self.query.nearby_radius_meters;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Config(format!(
                "query.nearby_radius_meters must be positive, got {}",
                radius
            )));
        }
        if let Some(max) = self.query.red_zone_max_distance_meters {
            if max.is_nan() || max <= 0.0 {
                return Err(Error::Config(format!(
                    "query.red_zone_max_distance_meters must be positive, got {}",
                    max
                )));
            }
        }
        if self.storage.timeout_ms == 0 {
            return Err(Error::Config("storage.timeout_ms must be positive".to_string()));
        }
        if !crate::store::available_backends().contains(&self.storage.backend.as_str()) {
            return Err(Error::Config(format!(
                "Unknown storage backend: {}",
                self.storage.backend
            )));
        }
        if !crate::index::available_indexes()
            .iter()
            .any(|i| i.name == self.index.backend)
        {
            return Err(Error::Config(format!("Unknown index: {}", self.index.backend)));
        }
        Ok(())
    }

    /// Zone classifier described by the `[zones]` section
    pub fn classifier(&self) -> Result<ZoneClassifier> {
        let thresholds = ZoneThresholds::new(
            self.zones.yellow_above,
            self.zones.orange_above,
            self.zones.red_above,
        )?;
        ZoneClassifier::new(thresholds, self.zones.radius_meters)
    }

    /// Least severe zone returned by the red-zone query
    pub fn red_zone_min_zone(&self) -> Result<Zone> {
        Zone::from_str(&self.query.red_zone_min_zone).map_err(Error::Config)
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["zones", "radius_meters"] => Some(self.zones.radius_meters.to_string()),
            ["zones", "yellow_above"] => Some(self.zones.yellow_above.to_string()),
            ["zones", "orange_above"] => Some(self.zones.orange_above.to_string()),
            ["zones", "red_above"] => Some(self.zones.red_above.to_string()),

            ["query", "nearby_radius_meters"] => Some(self.query.nearby_radius_meters.to_string()),
            ["query", "nearby_limit"] => Some(self.query.nearby_limit.to_string()),
            ["query", "red_zone_limit"] => Some(self.query.red_zone_limit.to_string()),
            ["query", "red_zone_min_zone"] => Some(self.query.red_zone_min_zone.clone()),
            ["query", "red_zone_max_distance_meters"] => Some(
                self.query
                    .red_zone_max_distance_meters
                    .map_or_else(|| "none".to_string(), |m| m.to_string()),
            ),

            ["index", "backend"] => Some(self.index.backend.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["storage", "backend"] => Some(self.storage.backend.clone()),
            ["storage", "path"] => Some(self.storage.path.clone().unwrap_or_default()),
            ["storage", "timeout_ms"] => Some(self.storage.timeout_ms.to_string()),

            ["report", "max_description_chars"] => {
                Some(self.report.max_description_chars.to_string())
            }

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid, the value has the wrong type, or the
    /// resulting config fails validation (the config is left unchanged then)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.set_unchecked(key, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn set_unchecked(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["zones", "radius_meters"] => {
                self.zones.radius_meters = parse_value(value, "radius")?;
            }
            ["zones", "yellow_above"] => {
                self.zones.yellow_above = parse_value(value, "threshold")?;
            }
            ["zones", "orange_above"] => {
                self.zones.orange_above = parse_value(value, "threshold")?;
            }
            ["zones", "red_above"] => {
                self.zones.red_above = parse_value(value, "threshold")?;
            }

            ["query", "nearby_radius_meters"] => {
                self.query.nearby_radius_meters = parse_value(value, "radius")?;
            }
            ["query", "nearby_limit"] => {
                self.query.nearby_limit = parse_value(value, "limit")?;
            }
            ["query", "red_zone_limit"] => {
                self.query.red_zone_limit = parse_value(value, "limit")?;
            }
            ["query", "red_zone_min_zone"] => {
                self.query.red_zone_min_zone = value.to_lowercase();
            }
            ["query", "red_zone_max_distance_meters"] => {
                self.query.red_zone_max_distance_meters = match value {
                    "" | "none" => None,
                    v => Some(parse_value(v, "distance")?),
                };
            }

            ["index", "backend"] => {
                self.index.backend = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(value, "port")?;
            }

            ["storage", "backend"] => {
                self.storage.backend = value.to_string();
            }
            ["storage", "path"] => {
                self.storage.path = (!value.is_empty()).then(|| value.to_string());
            }
            ["storage", "timeout_ms"] => {
                self.storage.timeout_ms = parse_value(value, "timeout")?;
            }

            ["report", "max_description_chars"] => {
                self.report.max_description_chars = parse_value(value, "length")?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "zones.radius_meters",
            "zones.yellow_above",
            "zones.orange_above",
            "zones.red_above",
            "query.nearby_radius_meters",
            "query.nearby_limit",
            "query.red_zone_limit",
            "query.red_zone_min_zone",
            "query.red_zone_max_distance_meters",
            "index.backend",
            "server.host",
            "server.port",
            "storage.backend",
            "storage.path",
            "storage.timeout_ms",
            "report.max_description_chars",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}
