//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Radius over which density is counted for classification (meters)
pub const DEFAULT_CLASSIFICATION_RADIUS: f64 = 2000.0;

/// Counts above this reach the yellow zone
pub const DEFAULT_YELLOW_ABOVE: usize = 10;

/// Counts above this reach the orange zone
pub const DEFAULT_ORANGE_ABOVE: usize = 30;

/// Counts above this reach the red zone
pub const DEFAULT_RED_ABOVE: usize = 50;

/// Radius of the "reports near me" query (meters)
pub const DEFAULT_NEARBY_RADIUS: f64 = 1000.0;

/// Maximum reports returned by the nearby query
pub const DEFAULT_NEARBY_LIMIT: usize = 100;

/// Maximum reports returned by the red-zone query
pub const DEFAULT_RED_ZONE_LIMIT: usize = 5;

/// Minimum zone reported by the red-zone query
pub const DEFAULT_RED_ZONE_MIN_ZONE: &str = "red";

/// Default spatial index
pub const DEFAULT_INDEX: &str = "rtree";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default storage backend
pub const DEFAULT_STORAGE_BACKEND: &str = "file";

/// Repository call timeout in milliseconds
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;

/// Maximum description length in characters
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 2000;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "disaster-zones";
