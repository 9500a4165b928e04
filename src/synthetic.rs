//! Synthetic walk generator for testing, benchmarking and simulation.
//!
//! Produces a realistic stream of raw fixes for a walker moving along a
//! gently winding heading, with Gaussian GPS noise and optional anomalies
//! injected at known indices.
//!
//! Feature-gated behind `synthetic`, not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use cleanwalk::synthetic::SyntheticWalk;
//!
//! let walk = SyntheticWalk {
//!     fix_count: 50,
//!     ..SyntheticWalk::default()
//! };
//! let fixes = walk.generate();
//! assert_eq!(fixes.len(), 50);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DEFAULT_LOCATION;
use crate::geo_utils::offset_point;
use crate::walk::SPEED_LIMIT_MPS;
use crate::{GpsPoint, LocationFix};

/// Parameters of a synthetic walk.
#[derive(Debug, Clone)]
pub struct SyntheticWalk {
    pub origin: GpsPoint,
    /// Number of fixes to generate (the first one sits at `origin`).
    pub fix_count: usize,
    /// Timestamp of the first fix.
    pub start_time_ms: i64,
    /// Spacing between fixes in milliseconds.
    pub interval_ms: i64,
    /// Walking speed in m/s.
    pub speed_mps: f64,
    /// Initial heading in radians (0 = north).
    pub heading: f64,
    /// Maximum random heading change per step in radians.
    pub max_turn: f64,
    pub gps_noise_sigma_meters: f64,
    /// Reported accuracy radius for every fix.
    pub accuracy: f32,
    pub provider: String,
    /// Index of a fix flagged as mock, if any.
    pub mock_at: Option<usize>,
    /// Index of a fix reporting a speed above the limit, if any.
    pub speeding_at: Option<usize>,
    pub seed: u64,
}

impl Default for SyntheticWalk {
    fn default() -> Self {
        Self {
            origin: DEFAULT_LOCATION,
            fix_count: 120,
            start_time_ms: 1_700_000_000_000,
            interval_ms: 5_000,
            speed_mps: 1.3,
            heading: 0.0,
            max_turn: 0.2,
            gps_noise_sigma_meters: 1.5,
            accuracy: 8.0,
            provider: "gps".to_string(),
            mock_at: None,
            speeding_at: None,
            seed: 42,
        }
    }
}

impl SyntheticWalk {
    /// A 10 minute walk with a mock fix halfway through.
    pub fn with_mock_location() -> Self {
        Self {
            mock_at: Some(60),
            ..Self::default()
        }
    }

    /// A 10 minute walk where one fix reports driving speed.
    pub fn with_speeding() -> Self {
        Self {
            speeding_at: Some(60),
            ..Self::default()
        }
    }

    /// Generate the fix sequence. Same parameters always give the same fixes.
    pub fn generate(&self) -> Vec<LocationFix> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let step = self.speed_mps * self.interval_ms as f64 / 1000.0;

        let mut heading = self.heading;
        let mut position = self.origin;
        let mut fixes = Vec::with_capacity(self.fix_count);

        for i in 0..self.fix_count {
            if i > 0 {
                heading += rng.gen_range(-self.max_turn..=self.max_turn);
                position = offset_point(&position, step * heading.cos(), step * heading.sin());
            }

            let observed = add_gps_noise(&position, self.gps_noise_sigma_meters, &mut rng);
            let speed = if self.speeding_at == Some(i) {
                SPEED_LIMIT_MPS * 1.5
            } else {
                self.speed_mps as f32
            };

            fixes.push(LocationFix {
                point: observed,
                timestamp_ms: self.start_time_ms + i as i64 * self.interval_ms,
                accuracy: self.accuracy,
                provider: self.provider.clone(),
                speed,
                is_mock: self.mock_at == Some(i),
            });
        }

        fixes
    }
}

/// Add Gaussian GPS noise to a point.
fn add_gps_noise(p: &GpsPoint, sigma_meters: f64, rng: &mut StdRng) -> GpsPoint {
    if sigma_meters <= 0.0 {
        return *p;
    }

    // Box-Muller transform
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    let z1 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();

    offset_point(p, z0 * sigma_meters, z1 * sigma_meters)
}
