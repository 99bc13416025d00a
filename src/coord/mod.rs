//! Geographic points and distances
//!
//! This module handles:
//! - Validated latitude/longitude points
//! - Great-circle (haversine) distance
//! - Unit-sphere projection used by the spatial index
//! - Uniform sampling of points inside a circle

pub mod distance;
pub mod point;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A validated geographic coordinate (latitude, longitude) in degrees
///
/// The fields are private: every `GeoPoint` in the crate went through
/// [`GeoPoint::new`], including deserialized ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    #[serde(alias = "lng")]
    lon: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawPoint) -> Result<Self> {
        GeoPoint::new(raw.lat, raw.lon)
    }
}

impl GeoPoint {
    /// Create a new point, rejecting out-of-range or non-finite values
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                lat
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                lon
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Build a point from possibly out-of-range values by clamping latitude
    /// and wrapping longitude into [-180, 180]
    ///
    /// Used for offsets computed from a valid center (sampling, test fixtures).
    pub(crate) fn normalized(lat: f64, lon: f64) -> Self {
        let lat = lat.clamp(-90.0, 90.0);
        let lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to another point in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance::haversine_distance(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
