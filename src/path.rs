//! Path construction, simplification and bounds.
//!
//! - `build_path` grows the walk path one accepted fix at a time
//! - `simplify_path` thins the finished path with Douglas-Peucker
//! - `build_bounds` computes a map viewport that never crops the endpoints

use geo::{LineString, SimplifyIdx};

use crate::geo_utils::project_local;
use crate::{Bounds, GpsPoint};

/// Douglas-Peucker tolerance in meters.
pub const SIMPLIFY_TOLERANCE_METERS: f64 = 1.0;

/// Margin kept around the start and end markers of a finished walk, in meters.
pub const ENDPOINT_MARGIN_METERS: f64 = 50.0;

/// Append `point` to `path`.
///
/// A path of exactly two identical points is the leftover of a walk whose
/// first accepted fix repeated the start position. It collapses to a single
/// point before the append so it is never drawn as a zero-length segment.
pub fn build_path(path: &[GpsPoint], point: GpsPoint) -> Vec<GpsPoint> {
    let mut next = match path {
        [a, b] if a == b => vec![*a],
        _ => path.to_vec(),
    };
    next.push(point);
    next
}

/// Simplify a recorded path with a 1 m Douglas-Peucker tolerance.
///
/// The path is closed into a loop before simplifying, which anchors the
/// farthest excursion from the start, and the closing point is dropped
/// afterwards. Paths with fewer than two points are returned unchanged.
pub fn simplify_path(path: &[GpsPoint]) -> Vec<GpsPoint> {
    if path.len() < 2 {
        return path.to_vec();
    }

    let mut closed = path.to_vec();
    closed.push(path[0]);

    let line = LineString::new(project_local(&path[0], &closed));
    let kept = line.simplify_idx(&SIMPLIFY_TOLERANCE_METERS);

    kept.into_iter()
        .filter(|&i| i < path.len())
        .map(|i| path[i])
        .collect()
}

/// Bounds covering the whole path plus a margin around its first and last point.
///
/// Returns `None` for an empty path.
pub fn build_bounds(path: &[GpsPoint]) -> Option<Bounds> {
    let covered = Bounds::from_points(path)?;
    let first = path.first()?;
    let last = path.last()?;
    Some(
        covered
            .union(&Bounds::around(first, ENDPOINT_MARGIN_METERS))
            .union(&Bounds::around(last, ENDPOINT_MARGIN_METERS)),
    )
}
