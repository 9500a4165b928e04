//! Payload for submitting a finished walk to the leaderboard service.
//!
//! Transport is left to the host; this module only shapes the data: the
//! distance in miles, and the path as a Google encoded polyline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalkError};
use crate::geo_utils::meters_to_miles;
use crate::walk::{WalkData, WalkState};
use crate::GpsPoint;

/// Coordinate precision of the encoded polyline (5 decimal places).
pub const POLYLINE_PRECISION: f64 = 1e5;

/// Submission record for a completed walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct WalkSubmission {
    pub account_id: String,
    pub distance_miles: f64,
    pub duration_millis: i64,
    pub bags_collected: u32,
    /// Path in Google encoded-polyline format
    pub encoded_path: String,
    /// Remote name of the uploaded walk photo
    pub image_file_name: String,
}

impl WalkSubmission {
    /// Build a submission from a completed walk.
    ///
    /// Fails with [`WalkError::WalkNotComplete`] for any other state, which
    /// includes walks ended by an anomaly.
    pub fn from_walk(account_id: &str, walk: &WalkData, image_file_name: &str) -> Result<Self> {
        if walk.state != WalkState::Complete {
            return Err(WalkError::WalkNotComplete {
                state: walk.state.to_string(),
            });
        }

        Ok(Self {
            account_id: account_id.to_string(),
            distance_miles: meters_to_miles(walk.distance_meters),
            duration_millis: walk.duration_millis,
            bags_collected: walk.bags_of_litter,
            encoded_path: encode_polyline(&walk.path),
            image_file_name: image_file_name.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode points with the Google polyline algorithm at precision 5.
///
/// # Example
/// ```
/// use cleanwalk::{encode_polyline, GpsPoint};
///
/// let path = [
///     GpsPoint::new(38.5, -120.2),
///     GpsPoint::new(40.7, -120.95),
///     GpsPoint::new(43.252, -126.453),
/// ];
/// assert_eq!(encode_polyline(&path), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode_polyline(points: &[GpsPoint]) -> String {
    let mut encoded = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

    for p in points {
        let lat = (p.latitude * POLYLINE_PRECISION).round() as i64;
        let lng = (p.longitude * POLYLINE_PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= 0x20 {
        out.push(char::from((((value & 0x1f) | 0x20) + 63) as u8));
        value >>= 5;
    }
    out.push(char::from((value + 63) as u8));
}
