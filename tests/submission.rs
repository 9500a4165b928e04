//! Tests for the walk submission payload

use std::sync::Arc;

use cleanwalk::geo_utils::offset_point;
use cleanwalk::{
    encode_polyline, GpsPoint, LocationFix, ManualClock, WalkConfig, WalkData, WalkError,
    WalkRepository, WalkSubmission,
};

const START: GpsPoint = GpsPoint {
    latitude: 43.1566,
    longitude: -77.6088,
};

fn completed_walk() -> WalkData {
    let clock = ManualClock::new(0);
    let repo = WalkRepository::with_clock(WalkConfig::default(), Arc::new(clock.clone()));
    repo.update_current_location(LocationFix::new(START, 0, 10.0));
    repo.start_walk();

    // 1609 m north then 500 m east
    let corner = offset_point(&START, 1609.344, 0.0);
    let end = offset_point(&corner, 0.0, 500.0);
    for (i, point) in [corner, end].into_iter().enumerate() {
        let t = (i as i64 + 1) * 600_000;
        clock.set(t);
        repo.update_current_location(LocationFix::new(point, t, 10.0));
    }
    repo.stop_walk();
    repo.update_bags_of_litter(4);
    repo.walk()
}

#[test]
fn test_submission_from_complete_walk() {
    let walk = completed_walk();
    let submission = WalkSubmission::from_walk("account-1", &walk, "walk-123.jpg").unwrap();

    assert_eq!(submission.account_id, "account-1");
    assert_eq!(submission.bags_collected, 4);
    assert_eq!(submission.duration_millis, 1_200_000);
    assert_eq!(submission.image_file_name, "walk-123.jpg");
    // ~2.1 km
    assert!((submission.distance_miles - 1.31).abs() < 0.02, "got {}", submission.distance_miles);
    assert_eq!(submission.encoded_path, encode_polyline(&walk.path));
}

#[test]
fn test_submission_requires_complete_walk() {
    let result = WalkSubmission::from_walk("account-1", &WalkData::idle(), "x.jpg");
    match result {
        Err(WalkError::WalkNotComplete { state }) => assert_eq!(state, "idle"),
        other => panic!("expected WalkNotComplete, got {:?}", other),
    }
}

#[test]
fn test_submission_json_is_camel_case() {
    let walk = completed_walk();
    let json = WalkSubmission::from_walk("a", &walk, "b.jpg")
        .unwrap()
        .to_json()
        .unwrap();
    assert!(json.contains("\"accountId\":\"a\""));
    assert!(json.contains("\"bagsCollected\":4"));
    assert!(json.contains("\"encodedPath\""));
    assert!(json.contains("\"imageFileName\":\"b.jpg\""));
}

#[test]
fn test_encode_polyline_reference_value() {
    let path = [
        GpsPoint::new(38.5, -120.2),
        GpsPoint::new(40.7, -120.95),
        GpsPoint::new(43.252, -126.453),
    ];
    assert_eq!(encode_polyline(&path), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    assert_eq!(encode_polyline(&[]), "");
}
