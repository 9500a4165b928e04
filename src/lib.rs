//! # CleanWalk
//!
//! Walk tracking engine for community litter-cleanup walks.
//!
//! This library provides:
//! - A location quality filter that decides which raw GPS fixes to trust
//! - A walk state machine with mock-location and over-speed detection
//! - Incremental path construction, Douglas-Peucker simplification and bounds
//! - A repository facade with latest-value observables for UI layers
//! - A location tracker that wires a platform location source into the repository
//!
//! ## Features
//!
//! - **`synthetic`** - Seeded synthetic fix generator for tests and benchmarks
//! - **`cli`** - `cleanwalk-cli` debugging tool (GPX replay, simulation)
//! - **`ffi`** - UniFFI bindings for mobile platforms (iOS/Android)
//!
//! ## Quick Start
//!
//! ```rust
//! use cleanwalk::{GpsPoint, LocationFix, WalkRepository, WalkState};
//!
//! let repo = WalkRepository::new();
//! repo.update_current_location(LocationFix::new(GpsPoint::new(43.1566, -77.6088), 0, 10.0));
//! repo.start_walk();
//! assert_eq!(repo.walk().state, WalkState::InProgress);
//!
//! repo.stop_walk();
//! assert_eq!(repo.walk().state, WalkState::Complete);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, WalkError};

// Geographic utilities (distance, length, metric offsets)
pub mod geo_utils;

// Location quality filter
pub mod filter;
pub use filter::{evaluate, is_better_location, FilterDecision, LocationFix};

// Path construction, simplification and bounds
pub mod path;
pub use path::{build_bounds, build_path, simplify_path};

// Walk state machine
pub mod walk;
pub use walk::{WalkData, WalkState, SPEED_LIMIT_MPS};

pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

pub mod config;
pub use config::{LocationRequest, WalkConfig, DEFAULT_LOCATION};

// Repository facade with observables
pub mod repository;
pub use repository::WalkRepository;

// Location update source contract and tracker
pub mod source;
pub use source::{LocationSource, LocationTracker, ReplaySource};

// Walk submission payload
pub mod submission;
pub use submission::{encode_polyline, WalkSubmission};

#[cfg(feature = "synthetic")]
pub mod synthetic;

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("CleanWalkRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use cleanwalk::GpsPoint;
/// let point = GpsPoint::new(43.1566, -77.6088); // Rochester, NY
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Like [`GpsPoint::is_valid`], as an error naming the offending coordinates.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(WalkError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Axis-aligned geographic bounding box.
///
/// Longitudes never wrap: a box near the antimeridian is clipped at ±180°,
/// and a path that crosses it spans the long way round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::point(first), |b, p| b.including(p)))
    }

    /// Degenerate bounds covering a single point.
    pub fn point(p: &GpsPoint) -> Self {
        Self {
            min_lat: p.latitude,
            max_lat: p.latitude,
            min_lng: p.longitude,
            max_lng: p.longitude,
        }
    }

    /// Square box extending `radius_meters` north, south, east and west of `center`.
    ///
    /// Clamped to the valid coordinate range.
    pub fn around(center: &GpsPoint, radius_meters: f64) -> Self {
        let south_west = geo_utils::offset_point(center, -radius_meters, -radius_meters);
        let north_east = geo_utils::offset_point(center, radius_meters, radius_meters);
        Self {
            min_lat: south_west.latitude.max(-90.0),
            max_lat: north_east.latitude.min(90.0),
            min_lng: south_west.longitude.max(-180.0),
            max_lng: north_east.longitude.min(180.0),
        }
    }

    /// Return these bounds expanded to include `p`.
    pub fn including(&self, p: &GpsPoint) -> Self {
        if self.contains(p) {
            return *self;
        }
        Self {
            min_lat: self.min_lat.min(p.latitude),
            max_lat: self.max_lat.max(p.latitude),
            min_lng: self.min_lng.min(p.longitude),
            max_lng: self.max_lng.max(p.longitude),
        }
    }

    /// Smallest bounds covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// Check whether `p` lies inside (or on the edge of) the bounds.
    pub fn contains(&self, p: &GpsPoint) -> bool {
        p.latitude >= self.min_lat
            && p.latitude <= self.max_lat
            && p.longitude >= self.min_lng
            && p.longitude <= self.max_lng
    }
}
