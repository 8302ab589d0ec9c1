//! Resampling and interpolation working together on sensor-shaped data.

use fitmerge_common::column_f64;
use fitmerge_model::InterpolationMethod;
use fitmerge_transform::{
    AggMethod, detect_sampling_rate, interpolate_time_gaps, resample_to_frequency,
};
use polars::prelude::{Column, DataFrame};

fn ten_hz_with_dropout() -> DataFrame {
    // 4 seconds at 10 Hz; second 2 lost entirely
    let mut times = Vec::new();
    let mut smo2 = Vec::new();
    for i in 0..40 {
        let t = f64::from(i) * 0.1;
        times.push(t);
        smo2.push(if (2.0..3.0).contains(&t) {
            None
        } else {
            Some(70.0 - t)
        });
    }
    DataFrame::new(vec![
        Column::new("time".into(), times),
        Column::new("smo2".into(), smo2),
    ])
    .unwrap()
}

#[test]
fn resample_then_interpolate() {
    let raw = ten_hz_with_dropout();
    let rate = detect_sampling_rate(&raw, "time");
    assert!((9.5..=10.5).contains(&rate));

    let one_hz = resample_to_frequency(&raw, "time", 1, None, AggMethod::Mean).unwrap();
    assert_eq!(one_hz.height(), 4);
    let smo2 = column_f64(one_hz.column("smo2").unwrap());
    assert!(smo2[2].is_none());

    let (filled, count) =
        interpolate_time_gaps(&one_hz, InterpolationMethod::Linear, 5, None).unwrap();
    assert_eq!(count, 1);
    let smo2 = column_f64(filled.column("smo2").unwrap());
    let expected = f64::midpoint(smo2[1].unwrap(), smo2[3].unwrap());
    assert!((smo2[2].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn median_aggregation_resists_spikes() {
    let df = DataFrame::new(vec![
        Column::new("time".into(), [0.0, 0.1, 0.2, 0.3, 0.4, 1.0, 1.1, 1.2]),
        Column::new("hr".into(), [120.0, 121.0, 250.0, 122.0, 121.0, 130.0, 131.0, 132.0]),
    ])
    .unwrap();
    let resampled = resample_to_frequency(&df, "time", 1, Some(10), AggMethod::Median).unwrap();
    assert_eq!(
        column_f64(resampled.column("hr").unwrap()),
        vec![Some(121.0), Some(131.0)]
    );
}
