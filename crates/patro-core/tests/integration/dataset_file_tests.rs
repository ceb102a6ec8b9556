use std::fs;

use serde_json::json;

use patro_core::validate::validate_dataset_file;
use patro_core::{CalendarData, CalendarMonth, ErrorKind, ScrapeConfig, Validator};

use crate::integration::common::days;

#[test]
fn exported_dataset_validates_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let mut data = CalendarData::new();
    data.insert(2081, (1..=12).map(|m| CalendarMonth::new(m, days(30))).collect());
    fs::write(&path, serde_json::to_string_pretty(&data).unwrap()).unwrap();

    let report = validate_dataset_file(&Validator::default(), &path).unwrap();
    assert!(report.is_valid, "{:?}", report.errors);
}

#[test]
fn hand_edited_file_reports_structural_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    let doc = json!({
        "2081": [
            { "month": 1, "days": [
                { "isHoliday": "no", "day": "१", "dayInEn": "1", "en": "14" }
            ]}
        ],
        "next": []
    });
    fs::write(&path, doc.to_string()).unwrap();

    let report = validate_dataset_file(&Validator::for_months(&[1]), &path).unwrap();
    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|e| e.contains("isHoliday must be a boolean")));
    assert!(report.errors.iter().any(|e| e.contains("Invalid year key 'next'")));
    assert!(report.warnings.iter().any(|w| w.contains("Unusual number of days")));
}

#[test]
fn unreadable_inputs_map_to_error_kinds() {
    let dir = tempfile::tempdir().unwrap();

    let missing = validate_dataset_file(&Validator::default(), &dir.path().join("nope.json"));
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::FileSystem);

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{ not json").unwrap();
    let err = validate_dataset_file(&Validator::default(), &garbage).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parsing);
}

#[test]
fn config_file_fills_missing_keys_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patro.json");
    fs::write(&path, r#"{ "years": [2080, 2081], "requestDelay": 250 }"#).unwrap();

    let config = ScrapeConfig::from_file(&path).unwrap();
    assert_eq!(config.years, vec![2080, 2081]);
    assert_eq!(config.months, (1..=12).collect::<Vec<_>>());
    assert_eq!(config.request_delay, 250);
    assert_eq!(config.max_retries, 3);
}

#[test]
fn config_file_with_bad_month_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patro.json");
    fs::write(&path, r#"{ "months": [0, 1] }"#).unwrap();

    let err = ScrapeConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
