//! Unified error handling for the walk engine.
//!
//! The walk state machine itself never fails: rejected fixes, missing
//! locations and out-of-order calls are all handled as guarded no-ops.
//! These errors surface at the edges, from location sources, walk
//! submission, and the debugging tools.

use thiserror::Error;

/// Errors produced around the walk engine.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The host has not granted (or has revoked) location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// The location source could not start delivering fixes.
    #[error("location source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A fix carried coordinates outside the valid lat/lng range.
    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// An operation needed a finished walk but got one in another state.
    #[error("walk is not complete (state: {state})")]
    WalkNotComplete { state: String },

    /// GPX input could not be read.
    #[error("gpx error: {0}")]
    Gpx(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WalkError>;

/// Convenience conversions from `Option` into `WalkError`.
pub trait OptionExt<T> {
    /// Map `None` to [`WalkError::SourceUnavailable`].
    fn ok_or_unavailable(self, reason: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unavailable(self, reason: &str) -> Result<T> {
        self.ok_or_else(|| WalkError::SourceUnavailable {
            reason: reason.to_string(),
        })
    }
}
