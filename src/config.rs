//! Engine and location request configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::walk::SPEED_LIMIT_MPS;
use crate::GpsPoint;

/// Start position used when no trusted location exists yet (downtown Rochester, NY).
pub const DEFAULT_LOCATION: GpsPoint = GpsPoint {
    latitude: 43.1566,
    longitude: -77.6088,
};

/// Configuration for the walk repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct WalkConfig {
    /// Fallback start position when `start_walk` runs before any fix was accepted.
    /// Default: downtown Rochester, NY
    pub default_location: GpsPoint,

    /// Reported speed (m/s) above which a walk ends as speeding.
    /// Default: 8.9408 (20 mph)
    pub speed_limit_mps: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION,
            speed_limit_mps: SPEED_LIMIT_MPS,
        }
    }
}

impl WalkConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Delivery cadence requested from a location source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationRequest {
    /// Desired interval between fixes in milliseconds. Default: 5000
    pub interval_ms: u64,
    /// Never deliver fixes closer together than this. Default: 3000
    pub fastest_interval_ms: u64,
    /// Minimum displacement in meters between fixes. Default: 1.0
    pub min_displacement_meters: f64,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            fastest_interval_ms: 3_000,
            min_displacement_meters: 1.0,
        }
    }
}
