//! Centralized constants for the disaster-zones crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// Storage settings
pub mod storage {
    /// Reports file name inside the data directory
    pub const REPORTS_FILE_NAME: &str = "reports.json";
}
