//! Integration tests for the AMM plugin using the `TestRun` harness.
//!
//! These spin up a headless Bevy App with `AmmPlugin` and drive whole runs
//! through the request/delivery events.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::AmmConfig;
use crate::error::{AmmError, SeriesError};
use crate::rainfall::{RainFormat, RawRainfall};
use crate::registry::attributes::*;
use crate::registry::AttributeRecord;
use crate::test_harness::TestRun;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 11, 14)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn basin(name: &str, area: f64) -> AttributeRecord {
    AttributeRecord::new()
        .with(NAME, name)
        .with(AREA, area)
        .with(CAPACITY, 6.0)
        .with(RECESSION_HALF_LIFE, 18.0)
        .with(DRY_CAPTURE, 0.02)
        .with(WET_CAPTURE, 0.3)
        .with(COLD_FACTOR, 1.0)
        .with(HOT_FACTOR, 0.6)
        .with(COLDEST_DAY, 32.0)
}

fn storm() -> RawRainfall {
    RawRainfall::new(RainFormat::Intensity, Duration::minutes(15))
        .with(start() + Duration::hours(2), 4.0)
        .with(start() + Duration::hours(2) + Duration::minutes(15), 8.0)
        .with(start() + Duration::hours(2) + Duration::minutes(30), 2.0)
        .with(start() + Duration::hours(20), 6.0)
}

fn two_days() -> AmmConfig {
    AmmConfig::default().with_window(start(), start() + Duration::days(2), Duration::minutes(15))
}

#[test]
fn nothing_runs_without_a_request() {
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("A", 1.0)])
        .with_rainfall(storm());
    run.idle();
    run.idle();
    assert_eq!(run.runs(), 0);
    assert!(run.report().is_none());
    assert!(run.delivered().is_empty());
}

#[test]
fn request_delivers_one_event_per_catchment() {
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("A", 1.0), basin("B", 2.5), basin("C", 0.4)])
        .with_rainfall(storm());
    run.request_run();

    assert_eq!(run.runs(), 1);
    let delivered = run.delivered();
    assert_eq!(delivered.len(), 3);
    for series in delivered {
        assert_eq!(series.len(), 192, "two days of 15-minute steps");
        assert!(series.total() > 0.0, "{} saw the storm", series.catchment);
    }
    let report = run.report().unwrap();
    assert_eq!(report.delivered.len(), 3);
    assert_eq!(report.moisture_runs, 1, "identical calibrations share a run");
    assert!(run.failures().is_empty());
    assert!(run.run_error().is_none());
}

#[test]
fn invalid_record_is_reported_and_valid_one_still_runs() {
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("Good", 1.0), basin("Bad", 1.0).with(WET_CAPTURE, 1.4)])
        .with_rainfall(storm());
    run.request_run();

    assert_eq!(run.delivered().len(), 1);
    assert_eq!(run.delivered()[0].catchment, "Good");
    let report = run.report().unwrap();
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].record(), "Bad");
}

#[test]
fn engine_failure_is_sent_as_event() {
    let cloudburst = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
        .with(start() + Duration::hours(5), 400.0);
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("Fine", 1.0), basin("Overflow", f64::MAX)])
        .with_rainfall(cloudburst);
    run.request_run();

    assert_eq!(run.delivered().len(), 1);
    assert_eq!(run.delivered()[0].catchment, "Fine");
    assert_eq!(run.failures().len(), 1);
    assert_eq!(run.failures()[0].catchment, "Overflow");
    assert_eq!(run.failures()[0].quantity, "flow");
}

#[test]
fn bad_rainfall_aborts_the_whole_run() {
    let unordered = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
        .with(start() + Duration::hours(3), 1.0)
        .with(start() + Duration::hours(1), 1.0);
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("A", 1.0)])
        .with_rainfall(unordered);
    run.request_run();

    assert!(run.report().is_none());
    assert!(run.delivered().is_empty());
    assert_eq!(
        run.run_error(),
        Some(&AmmError::Series(SeriesError::NonMonotonic { index: 1 }))
    );
}

#[test]
fn missing_rainfall_is_a_no_op() {
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("A", 1.0)]);
    run.request_run();
    assert_eq!(run.runs(), 1);
    assert!(run.report().is_none());
    assert!(run.run_error().is_none());
}

#[test]
fn repeated_requests_give_identical_series() {
    let mut run = TestRun::new()
        .with_config(two_days())
        .with_records(&[basin("A", 1.0), basin("B", 3.0).with(CAPACITY, 9.0)])
        .with_rainfall(storm());
    run.request_run();
    run.request_run();

    assert_eq!(run.runs(), 2);
    let delivered = run.delivered();
    assert_eq!(delivered.len(), 4);
    assert_eq!(delivered[0], delivered[2]);
    assert_eq!(delivered[1], delivered[3]);
}

#[test]
fn warm_up_is_carried_into_series() {
    let config = two_days().with_warm_up(Duration::hours(12));
    let mut run = TestRun::new()
        .with_config(config)
        .with_records(&[basin("A", 1.0)])
        .with_rainfall(storm());
    run.request_run();
    let series = &run.delivered()[0];
    assert_eq!(series.valid_from, 48);
    assert_eq!(series.valid_start(), start() + Duration::hours(12));
}
