//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the walk repository
//! to Kotlin and Swift. The host owns the platform location client and
//! pushes every raw fix through `update_current_location`; the UI reads
//! snapshots back after each call.

use std::sync::Arc;

use log::{debug, info};

use crate::{
    encode_polyline, init_logging, GpsPoint, LocationFix, WalkConfig, WalkData, WalkRepository,
    WalkState, WalkSubmission,
};

/// Walk repository handle exported to the mobile host.
#[derive(uniffi::Object)]
pub struct FfiWalkRepository {
    inner: WalkRepository,
}

#[uniffi::export]
impl FfiWalkRepository {
    /// Create a repository with default configuration.
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        init_logging();
        info!("[CleanWalkRust] Creating walk repository");
        Arc::new(Self {
            inner: WalkRepository::new(),
        })
    }

    /// Create a repository with custom configuration.
    #[uniffi::constructor]
    pub fn with_config(config: WalkConfig) -> Arc<Self> {
        init_logging();
        info!(
            "[CleanWalkRust] Creating walk repository (speed limit {:.2} m/s)",
            config.speed_limit_mps
        );
        Arc::new(Self {
            inner: WalkRepository::with_config(config),
        })
    }

    pub fn walk(&self) -> WalkData {
        self.inner.walk()
    }

    pub fn walk_state(&self) -> WalkState {
        self.inner.walk_state()
    }

    pub fn current_location(&self) -> Option<GpsPoint> {
        self.inner.current_location()
    }

    pub fn set_location_permission(&self, granted: bool) {
        self.inner.set_location_permission(granted);
    }

    pub fn start_walk(&self) -> WalkData {
        self.inner.start_walk();
        self.inner.walk()
    }

    pub fn stop_walk(&self) -> WalkData {
        self.inner.stop_walk();
        self.inner.walk()
    }

    /// Offer a raw fix. Returns whether it was accepted.
    pub fn update_current_location(&self, fix: LocationFix) -> bool {
        debug!(
            "[CleanWalkRust] Fix from {} at {} (acc {:.0}m)",
            fix.provider, fix.timestamp_ms, fix.accuracy
        );
        self.inner.update_current_location(fix)
    }

    pub fn update_bags_of_litter(&self, bags_of_litter: u32) {
        self.inner.update_bags_of_litter(bags_of_litter);
    }

    pub fn update_image_uri(&self, image_uri: String) {
        self.inner.update_image_uri(image_uri);
    }

    pub fn clear_walk(&self) {
        self.inner.clear_walk();
    }

    /// Build the submission payload for the completed walk.
    ///
    /// Returns `None` when the walk is not complete.
    pub fn submission(
        &self,
        account_id: String,
        image_file_name: String,
    ) -> Option<WalkSubmission> {
        let walk = self.inner.walk();
        match WalkSubmission::from_walk(&account_id, &walk, &image_file_name) {
            Ok(submission) => Some(submission),
            Err(e) => {
                info!("[CleanWalkRust] No submission: {}", e);
                None
            }
        }
    }
}

/// Encode a path as a Google encoded polyline.
#[uniffi::export]
pub fn ffi_encode_polyline(points: Vec<GpsPoint>) -> String {
    encode_polyline(&points)
}
