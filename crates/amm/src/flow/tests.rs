#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use crate::capture::{CaptureCurve, SeasonalCoefficients};
    use crate::config::AmmConfig;
    use crate::flow::{
        captured_run, flow_from_run, generate, FlowSeries, InflowSink, OutletInflows, OutputDetail,
    };
    use crate::rainfall::RainfallSeries;
    use crate::registry::{Calibration, Catchment};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn catchment(key: &str, area: f64, outlet: Option<&str>) -> Catchment {
        Catchment {
            key: key.to_string(),
            area,
            outlet: outlet.map(str::to_string),
            calibration: Calibration {
                capacity: 10.0,
                recession_half_life_hours: 6.0,
                curve: CaptureCurve {
                    dry_capture: 0.05,
                    wet_capture: 0.4,
                    seasonal: SeasonalCoefficients {
                        cold_factor: 1.0,
                        hot_factor: 0.7,
                        coldest_day: 20.0,
                    },
                },
            },
            initial_moisture: None,
        }
    }

    fn rain(depths: &[f64]) -> RainfallSeries {
        RainfallSeries::from_depths(start(), Duration::hours(1), depths.to_vec()).unwrap()
    }

    #[test]
    fn test_series_aligns_with_rainfall() {
        let rainfall = rain(&[0.0, 4.0, 2.0, 0.0, 0.0, 1.0]);
        let series = generate(&catchment("A", 2.0, None), &rainfall, &AmmConfig::default()).unwrap();
        assert_eq!(series.len(), rainfall.len());
        assert_eq!(series.start, rainfall.start());
        assert_eq!(series.step_seconds, 3600);
        assert_eq!(series.timestamp(5), rainfall.timestamp(5));
        assert_eq!(series.values[0], 0.0);
        assert!(series.values[1] > 0.0);
        assert!(series.values.iter().all(|v| *v >= 0.0));
        assert!(series.detail.is_none());
        assert_eq!(series.valid_from, 0);
    }

    #[test]
    fn test_flow_scales_with_area_and_conversion() {
        let rainfall = rain(&[3.0, 1.0, 0.0, 5.0]);
        let config = AmmConfig::default().with_unit_conversion(2.5);
        let small = generate(&catchment("A", 1.0, None), &rainfall, &config).unwrap();
        let large = generate(&catchment("B", 4.0, None), &rainfall, &config).unwrap();
        let base = generate(&catchment("A", 1.0, None), &rainfall, &AmmConfig::default()).unwrap();
        for i in 0..rainfall.len() {
            assert!((large.values[i] - 4.0 * small.values[i]).abs() < 1e-12);
            assert!((small.values[i] - 2.5 * base.values[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_full_detail_records_each_step() {
        let rainfall = rain(&[2.0, 0.0, 3.0]);
        let config = AmmConfig::default().with_detail(OutputDetail::Full);
        let series = generate(&catchment("A", 1.0, None), &rainfall, &config).unwrap();
        let detail = series.detail.as_ref().unwrap();
        assert_eq!(detail.len(), 3);
        assert_eq!(detail[0].rainfall, 2.0);
        for (record, value) in detail.iter().zip(&series.values) {
            assert!((record.captured - value).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&record.fraction));
        }
        assert_eq!(detail[2].moisture, series.terminal_moisture);
    }

    #[test]
    fn test_warm_up_sets_valid_from() {
        let rainfall = rain(&[1.0; 10]);
        let config = AmmConfig::default().with_warm_up(Duration::minutes(150));
        let series = generate(&catchment("A", 1.0, None), &rainfall, &config).unwrap();
        assert_eq!(series.valid_from, 3);
        assert_eq!(series.valid_values().len(), 7);
        assert_eq!(series.valid_start(), start() + Duration::hours(3));
    }

    #[test]
    fn test_non_finite_flow_aborts_catchment() {
        let rainfall = rain(&[0.0, 0.0, 80.0, 1.0]);
        let huge = catchment("Huge", f64::MAX, None);
        let err = generate(&huge, &rainfall, &AmmConfig::default()).unwrap_err();
        assert_eq!(err.catchment, "Huge");
        assert_eq!(err.step, 2);
        assert_eq!(err.quantity, "flow");
        assert!(err.value.is_infinite());
    }

    #[test]
    fn test_shared_run_matches_separate_generation() {
        let rainfall = rain(&[0.5, 7.0, 0.0, 0.0, 2.25, 0.0, 9.0]);
        let config = AmmConfig::default().with_unit_conversion(0.3);
        let a = catchment("A", 1.7, Some("MH-1"));
        let b = catchment("B", 23.9, None);
        let run = captured_run(&a, &rainfall, &config.seasons).unwrap();
        let shared = flow_from_run(&b, &run, &rainfall, &config).unwrap();
        let separate = generate(&b, &rainfall, &config).unwrap();
        assert_eq!(shared, separate);
    }

    #[test]
    fn test_outlet_inflows_sum_per_outlet() {
        let rainfall = rain(&[4.0, 0.0, 2.0]);
        let config = AmmConfig::default();
        let mut delivered: Vec<FlowSeries> = Vec::new();
        for c in [
            catchment("A", 1.0, Some("MH-1")),
            catchment("B", 3.0, Some("MH-1")),
            catchment("C", 2.0, Some("MH-2")),
            catchment("D", 5.0, None),
        ] {
            delivered.deliver(generate(&c, &rainfall, &config).unwrap());
        }
        assert_eq!(delivered.len(), 4);

        let inflows = OutletInflows::from_series(&delivered);
        assert_eq!(inflows.len(), 2);
        let mh1 = inflows.get("MH-1").unwrap();
        for i in 0..3 {
            let expected = delivered[0].values[i] + delivered[1].values[i];
            assert!((mh1[i] - expected).abs() < 1e-12);
        }
        assert_eq!(inflows.contributors("MH-1"), ["A".to_string(), "B".to_string()]);
        assert!(inflows.contributors("MH-9").is_empty());
        let outlets: Vec<&str> = inflows.iter().map(|(k, _)| k).collect();
        assert_eq!(outlets, vec!["MH-1", "MH-2"]);
    }

    #[test]
    fn test_outlet_sink_accumulates_deliveries() {
        let rainfall = rain(&[1.0, 1.0]);
        let config = AmmConfig::default();
        let mut sink = OutletInflows::new();
        sink.deliver(generate(&catchment("A", 1.0, Some("X")), &rainfall, &config).unwrap());
        sink.deliver(generate(&catchment("B", 1.0, Some("X")), &rainfall, &config).unwrap());
        let one = generate(&catchment("A", 1.0, Some("X")), &rainfall, &config).unwrap();
        let total = sink.get("X").unwrap();
        assert!((total[1] - 2.0 * one.values[1]).abs() < 1e-12);
    }

    fn series(key: &str, outlet: &str, values: Vec<f64>) -> FlowSeries {
        FlowSeries {
            catchment: key.to_string(),
            outlet: Some(outlet.to_string()),
            start: start(),
            step_seconds: 3600,
            values,
            valid_from: 0,
            terminal_moisture: 0.0,
            detail: None,
        }
    }

    #[test]
    fn test_outlet_total_refuses_to_overflow() {
        let mut inflows = OutletInflows::new();
        inflows.add(&series("Big", "MH-1", vec![1.0, f64::MAX])).unwrap();

        let err = inflows
            .add(&series("Bigger", "MH-1", vec![2.0, f64::MAX]))
            .unwrap_err();
        assert_eq!(err.catchment, "Bigger");
        assert_eq!(err.step, 1);
        assert_eq!(err.quantity, "outlet inflow");
        assert_eq!(inflows.get("MH-1").unwrap(), &[1.0, f64::MAX]);
        assert_eq!(inflows.contributors("MH-1"), ["Big".to_string()]);

        inflows.add(&series("Small", "MH-1", vec![3.0])).unwrap();
        assert_eq!(inflows.get("MH-1").unwrap(), &[4.0, f64::MAX]);
    }

    #[test]
    fn test_overflowing_delivery_is_recorded() {
        let delivered = vec![
            series("A", "MH-1", vec![f64::MAX]),
            series("B", "MH-1", vec![f64::MAX]),
            series("C", "MH-2", vec![1.0]),
        ];
        let inflows = OutletInflows::from_series(&delivered);
        assert_eq!(inflows.len(), 2);
        assert!(inflows.get("MH-1").unwrap().iter().all(|v| v.is_finite()));
        assert_eq!(inflows.overflows().len(), 1);
        assert_eq!(inflows.overflows()[0].catchment, "B");

        let mut sink = OutletInflows::new();
        for s in delivered {
            sink.deliver(s);
        }
        assert_eq!(sink.overflows(), inflows.overflows());
    }
}
