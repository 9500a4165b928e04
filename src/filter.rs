//! Location quality filter.
//!
//! Raw fixes are noisy. Accepting every one wastes work and puts jitter into
//! the recorded path, so each candidate is compared against the last fix we
//! accepted and only fresh, more accurate or clearly moved fixes win.
//!
//! All timing comes from the fixes' own timestamps; the filter never reads
//! the wall clock.

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::GpsPoint;

/// Two minutes in milliseconds. Older memory is not trusted.
pub const TWO_MINUTES_MS: i64 = 120_000;

/// Fifteen seconds in milliseconds. Periodic refresh interval.
pub const FIFTEEN_SECONDS_MS: i64 = 15_000;

/// Movement (meters) beyond which a newer fix is always taken.
pub const MOVED_DISTANCE_METERS: f64 = 1.0;

/// Largest accuracy degradation tolerated on refresh from the same provider.
pub const MINIMUM_ACCURACY_DELTA: f32 = 200.0;

/// Provider id used when the platform does not report one.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// A single raw location observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationFix {
    pub point: GpsPoint,
    /// Milliseconds since the Unix epoch, as reported by the platform.
    pub timestamp_ms: i64,
    /// Horizontal accuracy radius in meters (smaller is better).
    pub accuracy: f32,
    pub provider: String,
    /// Instantaneous speed in m/s. Zero when the platform cannot supply it.
    #[serde(default)]
    pub speed: f32,
    /// Platform mock-location indicator. False when unavailable.
    #[serde(default)]
    pub is_mock: bool,
}

impl LocationFix {
    /// Create a fix with no speed, no mock flag and an unknown provider.
    pub fn new(point: GpsPoint, timestamp_ms: i64, accuracy: f32) -> Self {
        Self {
            point,
            timestamp_ms,
            accuracy,
            provider: UNKNOWN_PROVIDER.to_string(),
            speed: 0.0,
            is_mock: false,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_mock(mut self, is_mock: bool) -> Self {
        self.is_mock = is_mock;
        self
    }
}

/// Outcome of comparing a candidate fix with the last accepted one.
///
/// Each variant names the rule that decided, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Nothing accepted yet.
    NoPrevious,
    /// Memory is at least two minutes old.
    SignificantlyNewer,
    /// Candidate is at least two minutes in the past (clock jump).
    SignificantlyOlder,
    /// Newer and with a smaller accuracy radius.
    MoreAccurate,
    /// Newer and more than a meter away.
    Moved,
    /// Refresh interval passed and accuracy did not get worse.
    Refresh,
    /// Refresh interval passed with a small degradation from the same provider.
    ToleratedDegradation,
    /// None of the acceptance rules applied.
    Rejected,
}

impl FilterDecision {
    pub fn is_accepted(&self) -> bool {
        !matches!(
            self,
            FilterDecision::SignificantlyOlder | FilterDecision::Rejected
        )
    }
}

/// Evaluate `candidate` against the last accepted fix.
pub fn evaluate(candidate: &LocationFix, last_accepted: Option<&LocationFix>) -> FilterDecision {
    let Some(last) = last_accepted else {
        return FilterDecision::NoPrevious;
    };

    let time_delta = candidate.timestamp_ms.saturating_sub(last.timestamp_ms);
    if time_delta >= TWO_MINUTES_MS {
        return FilterDecision::SignificantlyNewer;
    }
    if time_delta <= -TWO_MINUTES_MS {
        return FilterDecision::SignificantlyOlder;
    }

    let is_newer = time_delta > 0;
    let accuracy_delta = candidate.accuracy - last.accuracy;

    if is_newer && accuracy_delta < 0.0 {
        return FilterDecision::MoreAccurate;
    }
    if is_newer && haversine_distance(&candidate.point, &last.point) > MOVED_DISTANCE_METERS {
        return FilterDecision::Moved;
    }

    if time_delta >= FIFTEEN_SECONDS_MS {
        if accuracy_delta <= 0.0 {
            return FilterDecision::Refresh;
        }
        if accuracy_delta <= MINIMUM_ACCURACY_DELTA && candidate.provider == last.provider {
            return FilterDecision::ToleratedDegradation;
        }
    }

    FilterDecision::Rejected
}

/// Decide whether `candidate` should replace the last accepted fix.
///
/// # Example
/// ```
/// use cleanwalk::{is_better_location, GpsPoint, LocationFix};
///
/// let old = LocationFix::new(GpsPoint::new(43.1566, -77.6088), 0, 10.0);
/// let new = LocationFix::new(GpsPoint::new(43.1566, -77.6088), 130_000, 50.0);
///
/// assert!(is_better_location(&old, None));
/// assert!(is_better_location(&new, Some(&old)));
/// ```
pub fn is_better_location(candidate: &LocationFix, last_accepted: Option<&LocationFix>) -> bool {
    evaluate(candidate, last_accepted).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(t: i64, accuracy: f32) -> LocationFix {
        LocationFix::new(GpsPoint::new(43.1566, -77.6088), t, accuracy).with_provider("gps")
    }

    #[test]
    fn test_same_timestamp_same_place_rejected() {
        let a = fix(1_000, 10.0);
        assert_eq!(evaluate(&a.clone(), Some(&a)), FilterDecision::Rejected);
    }

    #[test]
    fn test_older_but_more_accurate_rejected() {
        // Accuracy only counts for newer fixes
        let a = fix(10_000, 10.0);
        let b = fix(5_000, 3.0);
        assert_eq!(evaluate(&b, Some(&a)), FilterDecision::Rejected);
    }

    #[test]
    fn test_degradation_boundary() {
        let a = fix(0, 10.0);
        let b = fix(FIFTEEN_SECONDS_MS, 10.0 + MINIMUM_ACCURACY_DELTA);
        assert_eq!(evaluate(&b, Some(&a)), FilterDecision::ToleratedDegradation);

        let c = fix(FIFTEEN_SECONDS_MS, 10.0 + MINIMUM_ACCURACY_DELTA + 1.0);
        assert_eq!(evaluate(&c, Some(&a)), FilterDecision::Rejected);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        assert_eq!(
            evaluate(&fix(1_000, 10.0), Some(&fix(i64::MIN, 10.0))),
            FilterDecision::SignificantlyNewer
        );
        assert_eq!(
            evaluate(&fix(i64::MIN, 10.0), Some(&fix(i64::MAX, 10.0))),
            FilterDecision::SignificantlyOlder
        );
    }
}
