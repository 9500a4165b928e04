//! Tests for the location tracker and location sources

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cleanwalk::geo_utils::offset_point;
use cleanwalk::source::{SessionEnd, SessionSummary};
use cleanwalk::{
    GpsPoint, LocationFix, LocationRequest, LocationSource, LocationTracker, ReplaySource, Result,
    WalkError, WalkRepository, WalkState,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

const ORIGIN: GpsPoint = GpsPoint {
    latitude: 43.1566,
    longitude: -77.6088,
};

fn fixes(count: usize) -> Vec<LocationFix> {
    (0..count)
        .map(|i| {
            LocationFix::new(offset_point(&ORIGIN, 5.0 * i as f64, 0.0), i as i64 * 4_000, 10.0)
                .with_provider("gps")
        })
        .collect()
}

/// Hands out a pre-built receiver on first subscribe.
struct ChannelSource {
    rx: Mutex<Option<mpsc::Receiver<LocationFix>>>,
}

impl LocationSource for ChannelSource {
    fn subscribe(&self, _request: &LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        self.rx
            .lock()
            .unwrap()
            .take()
            .ok_or(WalkError::SourceUnavailable {
                reason: "already subscribed".to_string(),
            })
    }
}

struct DeniedSource;

impl LocationSource for DeniedSource {
    fn subscribe(&self, _request: &LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        Err(WalkError::PermissionDenied)
    }
}

/// Replays the same fixes on every subscribe and counts subscriptions.
struct CountingSource {
    inner: ReplaySource,
    subscriptions: AtomicUsize,
}

impl LocationSource for CountingSource {
    fn subscribe(&self, request: &LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribe(request)
    }
}

#[tokio::test]
async fn test_replay_feeds_repository_in_order() {
    let repo = Arc::new(WalkRepository::new());
    repo.set_location_permission(true);
    repo.update_current_location(LocationFix::new(ORIGIN, -4_000, 10.0));
    repo.start_walk();

    let tracker = LocationTracker::new(Arc::clone(&repo), ReplaySource::new(fixes(5)));
    let summary = tracker.track_once().await.unwrap();

    assert_eq!(
        summary,
        SessionSummary {
            delivered: 5,
            accepted: 4, // the first fix repeats ORIGIN within 15 s
            end: SessionEnd::SourceClosed,
        }
    );
    assert_eq!(repo.current_location(), Some(fixes(5)[4].point));
    assert_eq!(repo.walk().path.len(), 5);
    assert_eq!(repo.walk_state(), WalkState::InProgress);
}

#[tokio::test]
async fn test_waits_for_permission() {
    let repo = Arc::new(WalkRepository::new());
    let tracker = LocationTracker::new(Arc::clone(&repo), ReplaySource::new(fixes(3)));

    let grant = async {
        tokio::task::yield_now().await;
        assert_eq!(repo.current_location(), None);
        repo.set_location_permission(true);
    };

    let (summary, _) = tokio::join!(tracker.track_once(), grant);
    assert_eq!(summary.unwrap().delivered, 3);
    assert!(repo.current_location().is_some());
}

#[tokio::test]
async fn test_subscribe_failure_is_not_a_walk_error() {
    let repo = Arc::new(WalkRepository::new());
    repo.set_location_permission(true);
    repo.start_walk();
    let before = repo.walk();

    let tracker = LocationTracker::new(Arc::clone(&repo), DeniedSource);
    let result = tracker.track_once().await;

    assert!(matches!(result, Err(WalkError::PermissionDenied)));
    assert_eq!(repo.walk(), before);
}

#[tokio::test]
async fn test_empty_replay_is_unavailable() {
    let repo = Arc::new(WalkRepository::new());
    repo.set_location_permission(true);
    repo.start_walk();
    let before = repo.walk();

    let tracker = LocationTracker::new(Arc::clone(&repo), ReplaySource::new(Vec::new()));
    let result = tracker.track_once().await;

    assert!(matches!(result, Err(WalkError::SourceUnavailable { .. })));
    assert_eq!(repo.walk(), before);
    assert_eq!(repo.current_location(), None);
}

#[tokio::test]
async fn test_revoking_permission_ends_stream() {
    let repo = Arc::new(WalkRepository::new());
    repo.set_location_permission(true);

    let (tx, rx) = mpsc::channel(8);
    let source = ChannelSource {
        rx: Mutex::new(Some(rx)),
    };
    let tracker = LocationTracker::new(Arc::clone(&repo), source);
    let all = fixes(2);

    let script = async {
        tx.send(all[0].clone()).await.unwrap();
        let mut location = repo.subscribe_current_location();
        location.wait_for(|l| l.is_some()).await.unwrap();

        repo.set_location_permission(false);
        // Sent after revocation: must never reach the repository
        tx.send(all[1].clone()).await.unwrap();
    };

    let (summary, _) = tokio::join!(tracker.track_once(), script);
    let summary = summary.unwrap();
    assert_eq!(summary.end, SessionEnd::PermissionRevoked);
    assert_eq!(summary.delivered, 1);
    assert_eq!(repo.current_location(), Some(all[0].point));
}

#[tokio::test]
async fn test_run_resubscribes_after_permission_restored() {
    let repo = Arc::new(WalkRepository::new());
    let source = CountingSource {
        inner: ReplaySource::new(fixes(2)),
        subscriptions: AtomicUsize::new(0),
    };
    let tracker = LocationTracker::new(Arc::clone(&repo), source);
    let count = || tracker.source().subscriptions.load(Ordering::SeqCst);

    let script = async {
        repo.set_location_permission(true);
        while count() < 1 {
            tokio::task::yield_now().await;
        }

        repo.set_location_permission(false);
        tokio::task::yield_now().await;
        assert_eq!(count(), 1);

        repo.set_location_permission(true);
        while count() < 2 {
            tokio::task::yield_now().await;
        }
    };

    let finished = timeout(Duration::from_secs(5), async {
        tokio::select! {
            _ = tracker.run() => unreachable!("tracker runs until dropped"),
            _ = script => {}
        }
    })
    .await;

    assert!(finished.is_ok(), "tracker did not resubscribe");
    assert_eq!(count(), 2);
}
