use patro_core::validate::validate_dataset_file;
use patro_core::{CalendarData, Exporter, Validator};
use patro_export::{ExportFormat, JsonExporter, export_dataset, load_dataset};

use crate::integration::common::two_years;

#[test]
fn exported_json_passes_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    JsonExporter::new().export(&two_years(), &path, false).unwrap();

    let report = validate_dataset_file(&Validator::default(), &path).unwrap();
    assert!(report.is_valid, "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn per_year_files_merge_back_into_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data = two_years();

    let paths = JsonExporter::new()
        .export_years(&data, &dir.path().join("years"), true)
        .unwrap();

    let merged: CalendarData = paths
        .iter()
        .map(|p| load_dataset(p).unwrap())
        .flat_map(|d| d.into_iter())
        .collect();
    assert_eq!(data, merged);
}

#[test]
fn simplified_export_loses_only_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let data = two_years();

    let paths = export_dataset(&data, dir.path(), "calendar", ExportFormat::Json, false).unwrap();
    let loaded = load_dataset(&paths[0]).unwrap();

    assert_eq!(loaded, data.simplified());
    assert_eq!(loaded.day_count(), data.day_count());
    let fifth = &loaded.get(2081).unwrap()[0].days[4];
    assert_eq!(fifth.tithi, None);
}

#[test]
fn csv_has_a_row_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let data = two_years();

    let paths = export_dataset(&data, dir.path(), "calendar", ExportFormat::Csv, true).unwrap();
    let raw = std::fs::read_to_string(&paths[0]).unwrap();

    assert_eq!(raw.lines().count(), data.day_count() + 1);
}
