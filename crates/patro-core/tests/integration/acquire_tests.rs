use std::sync::Mutex;
use std::time::Duration;

use patro_core::{
    CalendarData, ErrorKind, NoProgress, ScrapeConfig, ScrapeProgress, Validator, acquire,
};

use crate::integration::common::{SiteFactory, days};

fn config(years: impl IntoIterator<Item = i32>, months: impl IntoIterator<Item = u32>) -> ScrapeConfig {
    ScrapeConfig::default()
        .with_years(years)
        .with_months(months)
        .with_request_delay(Duration::ZERO)
}

#[tokio::test]
async fn full_year_passes_default_validator() {
    let site = SiteFactory::full(&[2081], 30);
    let data = acquire(config([2081], 1..=12), site.clone(), &NoProgress)
        .await
        .unwrap();

    let report = Validator::default().validate_data(&data);
    assert!(report.is_valid, "{:?}", report.errors);
    assert_eq!(data.day_count(), 12 * 30);
    assert!(*site.closed.lock().unwrap());
}

#[tokio::test]
async fn missing_page_aborts_as_network_error() {
    let site = SiteFactory::new([((2081, 1), days(31))]);
    let err = acquire(config([2081], [1, 2, 3]), site.clone(), &NoProgress)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.message().contains("404"));
    assert_eq!(*site.fetched.lock().unwrap(), vec![(2081, 1), (2081, 2)]);
    assert!(*site.closed.lock().unwrap());
}

#[tokio::test]
async fn progress_counts_every_unit() {
    let site = SiteFactory::full(&[2080, 2081], 29);
    let seen = Mutex::new(Vec::new());
    let reporter = |p: &ScrapeProgress| seen.lock().unwrap().push((p.completed_units(), p.total_units()));

    acquire(config([2080, 2081], [4, 5, 6]), site, &reporter)
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen.first(), Some(&(0, 6)));
    assert_eq!(seen.last(), Some(&(5, 6)));
}

#[tokio::test]
async fn dataset_serializes_keyed_by_year() {
    let site = SiteFactory::full(&[2081], 30);
    let data = acquire(config([2081], [1]), site, &NoProgress).await.unwrap();

    let json = serde_json::to_value(&data).unwrap();
    let day = &json["2081"][0]["days"][1];
    assert_eq!(day["dayInEn"], "2");
    assert_eq!(day["day"], "२");
    assert_eq!(day["tithi"], "एकादशी");

    let back: CalendarData = serde_json::from_value(json).unwrap();
    assert_eq!(back, data);
}
