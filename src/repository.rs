//! Walk repository: the public facade over the filter and the state machine.
//!
//! The current walk and the current trusted location live in `watch`
//! channels. Every change replaces the whole value inside the channel's
//! write lock, so readers never observe a half-applied update, and a new
//! subscriber immediately sees the latest value.
//!
//! Fix processing is serialized by the mutex around the last accepted fix.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::clock::{Clock, SystemClock};
use crate::filter::{evaluate, LocationFix};
use crate::walk::{WalkData, WalkState};
use crate::{GpsPoint, WalkConfig};

/// Walk tracking facade consumed by UI and view-model layers.
pub struct WalkRepository {
    config: WalkConfig,
    clock: Arc<dyn Clock>,
    last_accepted: Mutex<Option<LocationFix>>,
    current_location: watch::Sender<Option<GpsPoint>>,
    walk: watch::Sender<WalkData>,
    location_permission: watch::Sender<bool>,
}

impl Default for WalkRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkRepository {
    /// Create a repository with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(WalkConfig::default())
    }

    /// Create a repository with custom configuration.
    pub fn with_config(config: WalkConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a repository with custom configuration and time source.
    pub fn with_clock(config: WalkConfig, clock: Arc<dyn Clock>) -> Self {
        let (current_location, _) = watch::channel(None);
        let (walk, _) = watch::channel(WalkData::idle());
        let (location_permission, _) = watch::channel(false);
        Self {
            config,
            clock,
            last_accepted: Mutex::new(None),
            current_location,
            walk,
            location_permission,
        }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    // ========================================================================
    // Snapshots and observables
    // ========================================================================

    /// Snapshot of the current walk.
    pub fn walk(&self) -> WalkData {
        self.walk.borrow().clone()
    }

    /// Current state of the walk.
    pub fn walk_state(&self) -> WalkState {
        self.walk.borrow().state
    }

    /// Latest trusted location, if any fix has been accepted.
    pub fn current_location(&self) -> Option<GpsPoint> {
        *self.current_location.borrow()
    }

    /// Observe the walk. The receiver starts at the latest snapshot.
    pub fn subscribe_walk(&self) -> watch::Receiver<WalkData> {
        self.walk.subscribe()
    }

    /// Observe the trusted location. The receiver starts at the latest value.
    pub fn subscribe_current_location(&self) -> watch::Receiver<Option<GpsPoint>> {
        self.current_location.subscribe()
    }

    // ========================================================================
    // Location permission
    // ========================================================================

    /// Record whether the host currently holds location permission.
    ///
    /// Subscribers are only notified when the value changes.
    pub fn set_location_permission(&self, granted: bool) {
        let changed = self.location_permission.send_if_modified(|current| {
            if *current == granted {
                return false;
            }
            *current = granted;
            true
        });
        if changed {
            info!("[WalkRepository] Location permission granted: {}", granted);
        }
    }

    pub fn has_location_permission(&self) -> bool {
        *self.location_permission.borrow()
    }

    pub fn subscribe_location_permission(&self) -> watch::Receiver<bool> {
        self.location_permission.subscribe()
    }

    // ========================================================================
    // Walk lifecycle
    // ========================================================================

    /// Start a walk at the current trusted location.
    ///
    /// Falls back to the configured default location when no fix has been
    /// accepted yet, so a walk can always begin. Starting while another walk
    /// is active replaces it.
    pub fn start_walk(&self) {
        let start = self.current_location().unwrap_or_else(|| {
            warn!("[WalkRepository] No trusted location, starting at default location");
            self.config.default_location
        });
        let now = self.clock.now_millis();
        let previous = self.walk.send_replace(WalkData::started(start, now));
        if previous.state == WalkState::InProgress {
            warn!("[WalkRepository] Restarted a walk that was still in progress");
        }
        info!(
            "[WalkRepository] Walk started at ({:.5}, {:.5})",
            start.latitude, start.longitude
        );
    }

    /// Finish the walk in progress.
    ///
    /// Returns `false` (and changes nothing) unless a walk is in progress.
    /// Simplification runs outside the channel lock and is published with a
    /// compare-and-swap against the snapshot it was computed from.
    pub fn stop_walk(&self) -> bool {
        loop {
            let snapshot = self.walk();
            let Some(stopped) = snapshot.stopped(self.clock.now_millis()) else {
                debug!(
                    "[WalkRepository] stop_walk ignored in state {}",
                    snapshot.state
                );
                return false;
            };
            let (raw_points, distance, duration) = (
                snapshot.path.len(),
                stopped.distance_meters,
                stopped.duration_millis,
            );

            let swapped = self.walk.send_if_modified(|walk| {
                if *walk != snapshot {
                    return false;
                }
                *walk = stopped;
                true
            });
            if swapped {
                info!(
                    "[WalkRepository] Walk complete: {} raw points, {:.0}m in {}ms",
                    raw_points, distance, duration
                );
                return true;
            }
        }
    }

    /// Offer a raw fix to the repository.
    ///
    /// The fix is compared with the last accepted fix. If accepted it becomes
    /// the new reference and the new current location, and is folded into
    /// the walk when one is active. Rejected fixes change nothing.
    ///
    /// Returns whether the fix was accepted.
    pub fn update_current_location(&self, fix: LocationFix) -> bool {
        if let Err(e) = fix.point.validate() {
            warn!("[WalkRepository] Dropping fix: {}", e);
            return false;
        }

        let mut last_accepted = self.lock_last_accepted();
        let decision = evaluate(&fix, last_accepted.as_ref());
        if !decision.is_accepted() {
            debug!(
                "[WalkRepository] Rejected fix at {} ({:?})",
                fix.timestamp_ms, decision
            );
            return false;
        }
        debug!(
            "[WalkRepository] Accepted fix at {} ({:?})",
            fix.timestamp_ms, decision
        );

        self.current_location.send_replace(Some(fix.point));

        let speed_limit = self.config.speed_limit_mps;
        self.walk.send_if_modified(|walk| {
            if !walk.state.accepts_fixes() {
                return false;
            }
            let next = walk.fold_fix(&fix, speed_limit);
            if next.state != walk.state {
                warn!(
                    "[WalkRepository] Walk ended by anomaly: {} (speed {:.1} m/s, mock {})",
                    next.state, fix.speed, fix.is_mock
                );
            }
            let changed = next != *walk;
            *walk = next;
            changed
        });

        *last_accepted = Some(fix);
        true
    }

    /// Set the number of litter bags collected. Allowed in any state.
    pub fn update_bags_of_litter(&self, bags_of_litter: u32) {
        self.walk
            .send_modify(|walk| *walk = walk.with_bags_of_litter(bags_of_litter));
    }

    /// Set the walk photo reference. Allowed in any state.
    pub fn update_image_uri(&self, image_uri: impl Into<String>) {
        let image_uri = image_uri.into();
        self.walk
            .send_modify(|walk| *walk = walk.with_image_uri(image_uri));
    }

    /// Discard the walk and return to Idle.
    pub fn clear_walk(&self) {
        self.walk.send_replace(WalkData::idle());
        debug!("[WalkRepository] Walk cleared");
    }

    fn lock_last_accepted(&self) -> MutexGuard<'_, Option<LocationFix>> {
        // A panic while holding the lock cannot leave the slot half-written
        self.last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
