//! Great-circle distance and unit-sphere projection
//!
//! All distances are haversine distances on a sphere of radius
//! [`EARTH_RADIUS_METERS`]. The spatial index works on 3D unit vectors, where
//! the straight-line chord between two points grows monotonically with their
//! great-circle distance.

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::GeoPoint;
use std::f64::consts::PI;

/// Calculate the distance between two points in meters (Haversine formula)
pub fn haversine_distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.lat().to_radians();
    let lat2 = p2.lat().to_radians();
    let delta_lat = (p2.lat() - p1.lat()).to_radians();
    let delta_lon = (p2.lon() - p1.lon()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 near the antipode
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Check if a point is within a circle (boundary inclusive)
pub fn is_in_circle(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    haversine_distance(point, center) <= radius_meters
}

/// Project a point onto the unit sphere (x toward 0°E, z toward the north pole)
pub fn unit_vector(point: GeoPoint) -> [f64; 3] {
    let lat = point.lat().to_radians();
    let lon = point.lon().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Squared unit-sphere chord length spanning a great-circle distance
///
/// Distances past half the circumference saturate at the antipode (4.0).
pub fn chord_squared(distance_meters: f64) -> f64 {
    let angle = (distance_meters / EARTH_RADIUS_METERS).clamp(0.0, PI);
    let chord = 2.0 * (angle / 2.0).sin();
    chord * chord
}
