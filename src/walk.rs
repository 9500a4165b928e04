//! Walk state machine.
//!
//! A walk is an immutable [`WalkData`] snapshot. Every transition and every
//! folded fix produces a new snapshot; nothing is mutated in place, so a
//! reader holding an old snapshot always sees a consistent walk.
//!
//! ```text
//! Idle ──start──▶ InProgress ──stop──▶ Complete
//!                     │
//!                     ├──mock fix──▶ MockLocationDetected ◀─┐ any fix
//!                     │                     └───────────────┘
//!                     └──too fast──▶ SpeedingDetected ◀─────┐ any fix
//!                                           └───────────────┘
//! ```
//!
//! Complete and both anomaly states only leave through `clear`, which
//! returns to Idle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo_utils::path_length;
use crate::path::{build_bounds, build_path, simplify_path};
use crate::{Bounds, GpsPoint, LocationFix};

/// 20 mph in meters per second.
pub const SPEED_LIMIT_MPS: f32 = 8.9408;

/// Radius of the initial viewport around the start position, in meters.
pub const START_BOUNDS_RADIUS_METERS: f64 = 100.0;

/// Lifecycle state of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum WalkState {
    #[default]
    Idle,
    InProgress,
    Complete,
    MockLocationDetected,
    SpeedingDetected,
}

impl WalkState {
    /// Next state after an accepted fix.
    ///
    /// `mock` and `speeding` are the anomaly flags derived for the fix.
    /// Anomaly states are self-loops: once entered, no fix can leave them.
    pub fn on_fix(self, mock: bool, speeding: bool) -> WalkState {
        use WalkState::*;
        match (self, mock, speeding) {
            (MockLocationDetected, _, _) => MockLocationDetected,
            (SpeedingDetected, _, _) => SpeedingDetected,
            (InProgress, true, _) => MockLocationDetected,
            (InProgress, false, true) => SpeedingDetected,
            (InProgress, false, false) => InProgress,
            (Idle, _, _) => Idle,
            (Complete, _, _) => Complete,
        }
    }

    /// Whether the walk ended because of a detected anomaly.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            WalkState::MockLocationDetected | WalkState::SpeedingDetected
        )
    }

    /// Whether accepted fixes are routed into the walk in this state.
    pub fn accepts_fixes(&self) -> bool {
        *self == WalkState::InProgress || self.is_anomaly()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WalkState::Idle => "idle",
            WalkState::InProgress => "in_progress",
            WalkState::Complete => "complete",
            WalkState::MockLocationDetected => "mock_location_detected",
            WalkState::SpeedingDetected => "speeding_detected",
        }
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the current walk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct WalkData {
    pub state: WalkState,
    /// Milliseconds since the Unix epoch at which the walk started.
    pub start_time: i64,
    /// Only set once the walk is complete.
    pub duration_millis: i64,
    /// Length of the simplified path. Only set once the walk is complete.
    pub distance_meters: f64,
    pub start_position: Option<GpsPoint>,
    pub end_position: Option<GpsPoint>,
    pub path: Vec<GpsPoint>,
    pub bounds: Option<Bounds>,
    pub bags_of_litter: u32,
    pub image_uri: String,
}

impl WalkData {
    /// A fresh walk that has not started.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A walk that starts at `start` at time `now_ms`.
    pub fn started(start: GpsPoint, now_ms: i64) -> Self {
        Self {
            state: WalkState::InProgress,
            start_time: now_ms,
            start_position: Some(start),
            path: vec![start],
            bounds: Some(Bounds::around(&start, START_BOUNDS_RADIUS_METERS)),
            ..Self::default()
        }
    }

    /// Finish the walk at time `now_ms`.
    ///
    /// Returns `None` unless the walk is in progress. The path is replaced
    /// by its simplified version, and distance and bounds are computed from
    /// that simplified path.
    pub fn stopped(&self, now_ms: i64) -> Option<Self> {
        if self.state != WalkState::InProgress {
            return None;
        }

        let path = simplify_path(&self.path);
        Some(Self {
            state: WalkState::Complete,
            duration_millis: now_ms.saturating_sub(self.start_time).max(0),
            distance_meters: path_length(&path),
            end_position: path.last().copied(),
            bounds: build_bounds(&path).or(self.bounds),
            path,
            ..self.clone()
        })
    }

    /// Fold an accepted fix into the walk.
    ///
    /// In progress, the fix extends the path and bounds and may flag an
    /// anomaly. In an anomaly state only the state is re-derived (it stays
    /// put). Any other state is returned unchanged.
    pub fn fold_fix(&self, fix: &LocationFix, speed_limit: f32) -> Self {
        let mock = self.state == WalkState::MockLocationDetected || fix.is_mock;
        let speeding = self.state == WalkState::SpeedingDetected || fix.speed > speed_limit;
        let state = self.state.on_fix(mock, speeding);

        if self.state != WalkState::InProgress {
            return Self {
                state,
                ..self.clone()
            };
        }

        let point = fix.point;
        let bounds = match self.bounds {
            Some(bounds) => bounds.including(&point),
            None => Bounds::point(&point),
        };

        Self {
            state,
            path: build_path(&self.path, point),
            bounds: Some(bounds),
            ..self.clone()
        }
    }

    pub fn with_bags_of_litter(&self, bags_of_litter: u32) -> Self {
        Self {
            bags_of_litter,
            ..self.clone()
        }
    }

    pub fn with_image_uri(&self, image_uri: impl Into<String>) -> Self {
        Self {
            image_uri: image_uri.into(),
            ..self.clone()
        }
    }
}
