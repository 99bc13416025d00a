//! Point-in-circle generation
//!
//! Generates points uniformly distributed within a circle, plus the
//! destination-point formula used to place points at an exact distance.
//! Uses the sqrt() correction on radius to ensure uniform distribution.

use crate::constants::geo::{EARTH_RADIUS_METERS, METERS_PER_DEGREE_LAT};
use crate::coord::GeoPoint;
use rand::Rng;
use std::f64::consts::PI;

/// Point reached by travelling `distance_meters` from `origin` along the
/// great circle with initial `bearing_degrees` (0 = north, 90 = east)
///
/// `haversine_distance(origin, destination(origin, b, d))` equals `d` up to
/// floating-point error.
pub fn destination(origin: GeoPoint, bearing_degrees: f64, distance_meters: f64) -> GeoPoint {
    let angular = distance_meters / EARTH_RADIUS_METERS;
    let bearing = bearing_degrees.to_radians();
    let lat1 = origin.lat().to_radians();
    let lon1 = origin.lon().to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint::normalized(lat2.to_degrees(), lon2.to_degrees())
}

/// Generate a single random point uniformly distributed within a circle
///
/// # Algorithm
/// Uses the standard uniform disk point picking algorithm:
/// - r = radius * sqrt(random())  -- sqrt corrects for area distribution
/// - theta = 2 * PI * random()
/// - Convert polar to lat/lon offset
pub fn generate_point_in_circle<R: Rng + ?Sized>(
    center: GeoPoint,
    radius_meters: f64,
    rng: &mut R,
) -> GeoPoint {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();

    let r = radius_meters * u1.sqrt();
    let theta = 2.0 * PI * u2;

    // Longitude degrees per meter varies with latitude
    let meters_per_deg_lon = METERS_PER_DEGREE_LAT * center.lat().to_radians().cos();

    let delta_lat = (r * theta.cos()) / METERS_PER_DEGREE_LAT;
    let delta_lon = if meters_per_deg_lon > f64::EPSILON {
        (r * theta.sin()) / meters_per_deg_lon
    } else {
        0.0
    };

    GeoPoint::normalized(center.lat() + delta_lat, center.lon() + delta_lon)
}

/// Generate many random points uniformly distributed within a circle
pub fn generate_points_in_circle<R: Rng + ?Sized>(
    center: GeoPoint,
    radius_meters: f64,
    count: usize,
    rng: &mut R,
) -> Vec<GeoPoint> {
    (0..count)
        .map(|_| generate_point_in_circle(center, radius_meters, rng))
        .collect()
}
