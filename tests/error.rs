//! Tests for error module

use cleanwalk::error::{OptionExt, WalkError};
use cleanwalk::WalkConfig;

#[test]
fn test_error_display() {
    let err = WalkError::InvalidCoordinates {
        latitude: 95.0,
        longitude: 10.0,
    };
    assert!(err.to_string().contains("95"));

    let err = WalkError::WalkNotComplete {
        state: "in_progress".to_string(),
    };
    assert!(err.to_string().contains("in_progress"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_unavailable("no gps hardware");
    match result {
        Err(WalkError::SourceUnavailable { reason }) => assert_eq!(reason, "no gps hardware"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(Some(3).ok_or_unavailable("unused").unwrap(), 3);
}

#[test]
fn test_serialization_error_converts() {
    let err = WalkConfig::from_json("{").unwrap_err();
    assert!(matches!(err, WalkError::Serialization(_)));
}
