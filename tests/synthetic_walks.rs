//! End-to-end runs of synthetic walks through the repository

#![cfg(feature = "synthetic")]

use std::sync::Arc;

use cleanwalk::synthetic::SyntheticWalk;
use cleanwalk::{LocationFix, ManualClock, WalkConfig, WalkData, WalkRepository, WalkState};

fn run(fixes: &[LocationFix]) -> WalkData {
    let clock = ManualClock::new(fixes[0].timestamp_ms);
    let repo = WalkRepository::with_clock(WalkConfig::default(), Arc::new(clock.clone()));
    repo.update_current_location(fixes[0].clone());
    repo.start_walk();
    for fix in &fixes[1..] {
        clock.set(fix.timestamp_ms);
        repo.update_current_location(fix.clone());
    }
    repo.stop_walk();
    repo.walk()
}

#[test]
fn test_ten_minute_walk_completes() {
    let fixes = SyntheticWalk::default().generate();
    let walk = run(&fixes);

    assert_eq!(walk.state, WalkState::Complete);
    assert_eq!(walk.duration_millis, 119 * 5_000);
    // 1.3 m/s for ~10 minutes, plus noise
    assert!(
        walk.distance_meters > 500.0 && walk.distance_meters < 1_100.0,
        "Expected ~770m, got {}m",
        walk.distance_meters
    );
    // Simplification never adds points
    assert!(walk.path.len() <= fixes.len());
    let bounds = walk.bounds.unwrap();
    assert!(walk.path.iter().all(|p| bounds.contains(p)));
}

#[test]
fn test_mock_walk_ends_in_anomaly() {
    let walk = run(&SyntheticWalk::with_mock_location().generate());
    assert_eq!(walk.state, WalkState::MockLocationDetected);
    assert!(walk.path.len() <= 61);
}

#[test]
fn test_speeding_walk_ends_in_anomaly() {
    let walk = run(&SyntheticWalk::with_speeding().generate());
    assert_eq!(walk.state, WalkState::SpeedingDetected);
}
