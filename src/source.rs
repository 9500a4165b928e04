//! Location update source contract and the tracker that drives the repository.
//!
//! A [`LocationSource`] is the platform side: it hands out one sequential
//! stream of raw fixes per subscription. The [`LocationTracker`] waits for
//! location permission, subscribes, and feeds every fix in arrival order
//! into [`WalkRepository::update_current_location`].
//!
//! Permission loss and source failures end the current stream. They are
//! logged, never raised into the walk; tracking resumes once permission is
//! granted again.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};

use crate::config::LocationRequest;
use crate::error::{OptionExt, Result, WalkError};
use crate::filter::LocationFix;
use crate::repository::WalkRepository;

/// Platform supplier of raw location fixes.
///
/// Each call to `subscribe` starts a new, independent stream. Implementations
/// should:
/// - emit the last known fix first when one is available
/// - deliver fixes sequentially at roughly the requested cadence
/// - stop delivering once the receiver is dropped
/// - close the stream (drop the sender) when permission is revoked
pub trait LocationSource: Send + Sync {
    fn subscribe(&self, request: &LocationRequest) -> Result<mpsc::Receiver<LocationFix>>;
}

/// Source that replays a fixed list of fixes and then closes.
///
/// An empty replay is unavailable rather than an immediately closed stream.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    fixes: Vec<LocationFix>,
}

impl ReplaySource {
    pub fn new(fixes: Vec<LocationFix>) -> Self {
        Self { fixes }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl LocationSource for ReplaySource {
    fn subscribe(&self, _request: &LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        // No last-known fix to emit first
        self.fixes.first().ok_or_unavailable("replay has no fixes")?;

        let (tx, rx) = mpsc::channel(self.fixes.len());
        for fix in &self.fixes {
            tx.try_send(fix.clone())
                .map_err(|e| WalkError::SourceUnavailable {
                    reason: e.to_string(),
                })?;
        }
        Ok(rx)
    }
}

/// Why a tracking session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The source closed its stream.
    SourceClosed,
    /// Location permission was revoked while streaming.
    PermissionRevoked,
}

/// Outcome of a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Fixes received from the source.
    pub delivered: usize,
    /// Fixes the repository accepted.
    pub accepted: usize,
    pub end: SessionEnd,
}

/// Connects a [`LocationSource`] to a [`WalkRepository`].
pub struct LocationTracker<S: LocationSource> {
    repository: Arc<WalkRepository>,
    source: S,
    request: LocationRequest,
}

impl<S: LocationSource> LocationTracker<S> {
    pub fn new(repository: Arc<WalkRepository>, source: S) -> Self {
        Self::with_request(repository, source, LocationRequest::default())
    }

    pub fn with_request(
        repository: Arc<WalkRepository>,
        source: S,
        request: LocationRequest,
    ) -> Self {
        Self {
            repository,
            source,
            request,
        }
    }

    pub fn repository(&self) -> &Arc<WalkRepository> {
        &self.repository
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Track locations until the future is dropped.
    ///
    /// Waits for permission, streams until the source closes or permission
    /// is revoked, then waits for the next permission change and subscribes
    /// again. Dropping the future drops the active subscription.
    pub async fn run(&self) {
        let mut permission = self.repository.subscribe_location_permission();
        loop {
            match self.session(&mut permission).await {
                Ok(summary) => {
                    info!(
                        "[LocationTracker] Session ended ({:?}): {} fixes, {} accepted",
                        summary.end, summary.delivered, summary.accepted
                    );
                    if summary.end == SessionEnd::PermissionRevoked {
                        continue;
                    }
                }
                Err(e) => warn!("[LocationTracker] Subscription failed: {}", e),
            }
            // Wait for permission to be toggled before subscribing again
            if permission.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run a single subscription to completion.
    pub async fn track_once(&self) -> Result<SessionSummary> {
        let mut permission = self.repository.subscribe_location_permission();
        self.session(&mut permission).await
    }

    async fn session(&self, permission: &mut watch::Receiver<bool>) -> Result<SessionSummary> {
        if permission.wait_for(|granted| *granted).await.is_err() {
            return Err(WalkError::PermissionDenied);
        }

        let mut fixes = self.source.subscribe(&self.request)?;
        debug!(
            "[LocationTracker] Subscribed (interval {}ms, fastest {}ms, {:.1}m)",
            self.request.interval_ms,
            self.request.fastest_interval_ms,
            self.request.min_displacement_meters
        );

        let mut delivered = 0;
        let mut accepted = 0;
        let end = loop {
            tokio::select! {
                biased;
                changed = permission.changed() => {
                    if changed.is_err() || !*permission.borrow_and_update() {
                        break SessionEnd::PermissionRevoked;
                    }
                }
                fix = fixes.recv() => match fix {
                    Some(fix) => {
                        delivered += 1;
                        if self.repository.update_current_location(fix) {
                            accepted += 1;
                        }
                    }
                    None => break SessionEnd::SourceClosed,
                },
            }
        };

        Ok(SessionSummary {
            delivered,
            accepted,
            end,
        })
    }
}
