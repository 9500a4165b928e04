//! Geographic utilities: great-circle distance, path length and metric offsets.
//!
//! Distances are in meters and coordinates in WGS84 degrees. The heavy
//! lifting is delegated to the `geo` crate's haversine implementations.

use geo::{Coord, HaversineDistance, HaversineLength, LineString, Point};

use crate::GpsPoint;

/// Mean earth radius used for local projections, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

fn to_point(p: &GpsPoint) -> Point<f64> {
    Point::new(p.longitude, p.latitude)
}

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: &GpsPoint, b: &GpsPoint) -> f64 {
    to_point(a).haversine_distance(&to_point(b))
}

/// Great-circle length of an ordered path in meters.
///
/// Returns 0.0 for paths with fewer than two points.
pub fn path_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    line.haversine_length()
}

/// Convert a distance in meters to degrees of longitude at the given latitude.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let cos_lat = latitude.to_radians().cos().abs().max(1e-6);
    meters / (METERS_PER_DEGREE_LAT * cos_lat)
}

/// Offset a point by `north` and `east` meters.
///
/// Uses a local equirectangular approximation, accurate to well under a
/// meter for offsets of a few hundred meters.
pub fn offset_point(origin: &GpsPoint, north: f64, east: f64) -> GpsPoint {
    GpsPoint::new(
        origin.latitude + north / METERS_PER_DEGREE_LAT,
        origin.longitude + meters_to_degrees(east, origin.latitude),
    )
}

/// Project points onto a local metric plane centered at `origin`.
///
/// x is meters east, y is meters north. Used for tolerance-based
/// simplification where the tolerance is expressed in meters.
pub fn project_local(origin: &GpsPoint, points: &[GpsPoint]) -> Vec<Coord<f64>> {
    let cos_lat = origin.latitude.to_radians().cos();
    points
        .iter()
        .map(|p| Coord {
            x: (p.longitude - origin.longitude).to_radians() * EARTH_RADIUS_METERS * cos_lat,
            y: (p.latitude - origin.latitude).to_radians() * EARTH_RADIUS_METERS,
        })
        .collect()
}

/// Convert meters to statute miles.
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / 1609.344
}
