#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use crate::config::AmmConfig;
    use crate::error::SeriesError;
    use crate::rainfall::{conform, conform_to_grid, RainFormat, RainfallSeries, RawRainfall};

    fn at(hour: i64, minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(hour)
            + Duration::minutes(minute)
    }

    fn hourly_config(hours: i64) -> AmmConfig {
        AmmConfig::default().with_window(at(0, 0), at(hours, 0), Duration::hours(1))
    }

    fn assert_depths(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-9, "step {i}: {a} != {e} in {actual:?}");
        }
    }

    #[test]
    fn test_aligned_volume_passes_through() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
            .with(at(0, 0), 1.0)
            .with(at(1, 0), 0.0)
            .with(at(2, 0), 3.5);
        let series = conform(&raw, &hourly_config(3)).unwrap();
        assert_depths(series.depths(), &[1.0, 0.0, 3.5]);
    }

    #[test]
    fn test_fine_volume_aggregates_into_coarse_steps() {
        let mut raw = RawRainfall::new(RainFormat::Volume, Duration::minutes(15));
        for q in 0..8 {
            raw.push(at(0, 15 * q), 0.25);
        }
        let series = conform(&raw, &hourly_config(2)).unwrap();
        assert_depths(series.depths(), &[1.0, 1.0]);
    }

    #[test]
    fn test_coarse_volume_splits_by_overlap() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(2)).with(at(0, 30), 4.0);
        let series = conform(&raw, &hourly_config(3)).unwrap();
        assert_depths(series.depths(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_gaps_receive_zero_rain() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
            .with(at(0, 0), 2.0)
            .with(at(4, 0), 1.0);
        let series = conform(&raw, &hourly_config(6)).unwrap();
        assert_depths(series.depths(), &[2.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_reading_is_clipped_at_next_observation() {
        // Nominal interval of two hours, but readings arrive hourly.
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(2))
            .with(at(0, 0), 1.0)
            .with(at(1, 0), 1.0);
        let series = conform(&raw, &hourly_config(3)).unwrap();
        assert_depths(series.depths(), &[1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_intensity_is_converted_to_depth() {
        let raw = RawRainfall::new(RainFormat::Intensity, Duration::minutes(30))
            .with(at(0, 0), 2.0)
            .with(at(0, 30), 4.0);
        let series = conform(&raw, &hourly_config(1)).unwrap();
        assert_depths(series.depths(), &[3.0]);
    }

    #[test]
    fn test_cumulative_is_differenced() {
        let raw = RawRainfall::new(RainFormat::Cumulative, Duration::hours(1))
            .with(at(0, 0), 10.0)
            .with(at(1, 0), 12.0)
            .with(at(3, 0), 16.0);
        let series = conform(&raw, &hourly_config(3)).unwrap();
        assert_depths(series.depths(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_rain_outside_window_is_dropped() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
            .with(at(-1, 0), 5.0)
            .with(at(0, 0), 1.0)
            .with(at(2, 0), 7.0);
        let series = conform(&raw, &hourly_config(2)).unwrap();
        assert_depths(series.depths(), &[1.0, 0.0]);
    }

    #[test]
    fn test_total_depth_is_conserved_for_irregular_records() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut raw = RawRainfall::new(RainFormat::Volume, Duration::minutes(10));
        let mut minute = 0;
        let mut expected = 0.0;
        while minute < 23 * 60 {
            let depth: f64 = rng.gen_range(0.0..2.0);
            raw.push(at(0, minute), depth);
            expected += depth;
            minute += rng.gen_range(1..40);
        }
        let config = AmmConfig::default().with_window(at(0, 0), at(24, 0), Duration::minutes(15));
        let series = conform(&raw, &config).unwrap();
        assert_eq!(series.len(), 96);
        assert!(
            (series.total() - expected).abs() < 1e-9,
            "{} != {}",
            series.total(),
            expected
        );
        assert!(series.depths().iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_partial_last_step() {
        let config = AmmConfig::default().with_window(at(0, 0), at(1, 30), Duration::hours(1));
        let raw = RawRainfall::new(RainFormat::Volume, Duration::minutes(30))
            .with(at(1, 0), 1.0)
            .with(at(1, 30), 1.0);
        let series = conform(&raw, &config).unwrap();
        // The last step runs a full hour past the window's end.
        assert_depths(series.depths(), &[0.0, 2.0]);
    }

    #[test]
    fn test_empty_record_is_rejected() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1));
        assert_eq!(conform(&raw, &hourly_config(2)), Err(SeriesError::Empty));
    }

    #[test]
    fn test_unordered_record_is_rejected() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
            .with(at(1, 0), 1.0)
            .with(at(1, 0), 1.0);
        assert_eq!(
            conform(&raw, &hourly_config(2)),
            Err(SeriesError::NonMonotonic { index: 1 })
        );
    }

    #[test]
    fn test_negative_and_nan_values_are_rejected() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1))
            .with(at(0, 0), 1.0)
            .with(at(1, 0), -0.5);
        assert_eq!(
            conform(&raw, &hourly_config(2)),
            Err(SeriesError::InvalidValue {
                index: 1,
                value: -0.5
            })
        );

        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1)).with(at(0, 0), f64::NAN);
        assert!(matches!(
            conform(&raw, &hourly_config(2)),
            Err(SeriesError::InvalidValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_decreasing_cumulative_is_rejected() {
        let raw = RawRainfall::new(RainFormat::Cumulative, Duration::hours(1))
            .with(at(0, 0), 4.0)
            .with(at(1, 0), 3.0);
        assert_eq!(
            conform(&raw, &hourly_config(2)),
            Err(SeriesError::CumulativeDecrease {
                index: 1,
                previous: 4.0,
                value: 3.0
            })
        );
    }

    #[test]
    fn test_record_outside_window_is_rejected() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1)).with(at(10, 0), 1.0);
        assert_eq!(conform(&raw, &hourly_config(2)), Err(SeriesError::NoOverlap));
    }

    #[test]
    fn test_invalid_step_is_rejected() {
        let raw = RawRainfall::new(RainFormat::Volume, Duration::hours(1)).with(at(0, 0), 1.0);
        assert_eq!(
            conform_to_grid(&raw, at(0, 0), 0, 4),
            Err(SeriesError::InvalidInterval { seconds: 0 })
        );
        let raw = RawRainfall::new(RainFormat::Volume, Duration::zero()).with(at(0, 0), 1.0);
        assert_eq!(
            conform_to_grid(&raw, at(0, 0), 3600, 4),
            Err(SeriesError::InvalidInterval { seconds: 0 })
        );
    }

    #[test]
    fn test_from_depths_validates_and_timestamps() {
        let series = RainfallSeries::from_depths(at(6, 0), Duration::minutes(15), vec![0.0, 1.0, 2.0])
            .unwrap();
        assert_eq!(series.timestamp(2), at(6, 30));
        assert!((series.step_hours() - 0.25).abs() < f64::EPSILON);
        let pairs: Vec<_> = series.iter().collect();
        assert_eq!(pairs[1], (at(6, 15), 1.0));

        assert_eq!(
            RainfallSeries::from_depths(at(0, 0), Duration::hours(1), vec![1.0, -1.0]),
            Err(SeriesError::InvalidValue {
                index: 1,
                value: -1.0
            })
        );
        assert_eq!(
            RainfallSeries::from_depths(at(0, 0), Duration::hours(1), Vec::new()),
            Err(SeriesError::Empty)
        );
    }
}
