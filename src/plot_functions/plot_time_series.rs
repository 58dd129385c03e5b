// src/plot_functions/plot_time_series.rs

use std::error::Error;
use std::path::Path;

use log::warn;
use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::constants::{MICROSECONDS_PER_SECOND, TIMESTAMP_FIELD, X_AXIS_LABEL};
use crate::data_input::frame::Frame;
use crate::plot_framework::{calculate_range, draw_single_plot, PlotConfig, PlotSeries};
use crate::series_config::PlotSpec;

/// Converts microsecond timestamps to seconds and subtracts `offset_s`.
pub fn time_axis_seconds(timestamps_us: &Array1<f64>, offset_s: f64) -> Array1<f64> {
    timestamps_us.mapv(|t| t / MICROSECONDS_PER_SECOND - offset_s)
}

/// Builds the chart description for `plot_spec` from `frame`.
/// Series whose column is missing are skipped; `None` if nothing is left.
pub fn build_time_series_config(frame: &Frame, plot_spec: &PlotSpec) -> Option<PlotConfig> {
    let Some(timestamps) = frame.column(TIMESTAMP_FIELD) else {
        warn!("No '{TIMESTAMP_FIELD}' column, nothing to plot");
        return None;
    };
    let time = time_axis_seconds(timestamps, plot_spec.offset_s);

    let mut series = Vec::new();
    let mut val_min = f64::INFINITY;
    let mut val_max = f64::NEG_INFINITY;
    for spec in &plot_spec.series {
        let Some(values) = frame.column(&spec.column) else {
            warn!("Column '{}' not in '{}', skipping series '{}'", spec.column, plot_spec.stream, spec.label);
            continue;
        };

        let lo = *values.min_skipnan();
        let hi = *values.max_skipnan();
        if lo.is_finite() && hi.is_finite() {
            val_min = val_min.min(lo);
            val_max = val_max.max(hi);
        }

        let data: Vec<(f64, f64)> = time
            .iter()
            .zip(values.iter())
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(&t, &v)| (t, v))
            .collect();

        series.push(PlotSeries {
            data,
            label: spec.label.clone(),
            color: spec.color,
            stroke_width: spec.stroke_width,
        });
    }

    if series.is_empty() || !val_min.is_finite() {
        return None;
    }

    let time_min = *time.min_skipnan();
    let time_max = *time.max_skipnan();
    if !time_min.is_finite() || !time_max.is_finite() {
        return None;
    }
    let x_range = if time_max > time_min {
        time_min..time_max
    } else {
        let (lo, hi) = calculate_range(time_min, time_max);
        lo..hi
    };
    let (final_value_min, final_value_max) = calculate_range(val_min, val_max);

    let title = plot_spec
        .title
        .clone()
        .unwrap_or_else(|| format!("{} (instance {})", plot_spec.stream, plot_spec.multi_id));

    Some(PlotConfig {
        title,
        x_range,
        y_range: final_value_min..final_value_max,
        series,
        x_label: X_AXIS_LABEL.to_string(),
        y_label: plot_spec.y_label.clone(),
    })
}

/// Renders the configured series of one converted stream against time.
/// Returns whether any series was drawn.
pub fn plot_time_series(
    frame: &Frame,
    plot_spec: &PlotSpec,
    output_file: &Path,
    root_name: &str,
) -> Result<bool, Box<dyn Error>> {
    let output_file = output_file.to_string_lossy().to_string();
    draw_single_plot(&output_file, root_name, &plot_spec.stream, || {
        build_time_series_config(frame, plot_spec)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series_config::SeriesSpec;

    fn gps_frame() -> Frame {
        let csv = "timestamp,lat,lon\n36000000,1.0,5.0\n37000000,2.0,nan\n38000000,4.0,7.0\n";
        Frame::from_reader(csv.as_bytes(), b',').unwrap()
    }

    #[test]
    fn time_axis_is_seconds_minus_offset() {
        let t = time_axis_seconds(&Array1::from(vec![1_000_000.0, 2_000_000.0, 35_500_000.0]), 35.5);
        assert_eq!(t.to_vec(), vec![-34.5, -33.5, 0.0]);
    }

    #[test]
    fn builds_default_series_config() {
        let config = build_time_series_config(&gps_frame(), &PlotSpec::default()).unwrap();
        assert_eq!(config.series.len(), 1);
        assert_eq!(config.series[0].data, vec![(0.5, 1.0), (1.5, 2.0), (2.5, 4.0)]);
        assert_eq!(config.x_range, 0.5..2.5);
        assert!(config.y_range.start < 1.0 && config.y_range.end > 4.0);
        assert_eq!(config.x_label, "Time (seconds)");
    }

    #[test]
    fn nan_points_are_dropped_and_missing_columns_skipped() {
        let mut spec = PlotSpec::default();
        spec.series.push(SeriesSpec::parse("lon", 1).unwrap());
        spec.series.push(SeriesSpec::parse("alt", 2).unwrap());
        let config = build_time_series_config(&gps_frame(), &spec).unwrap();
        assert_eq!(config.series.len(), 2);
        assert_eq!(config.series[1].data, vec![(0.5, 5.0), (2.5, 7.0)]);
    }

    #[test]
    fn nothing_to_plot_without_known_columns() {
        let mut spec = PlotSpec::default();
        spec.series = vec![SeriesSpec::parse("alt", 0).unwrap()];
        assert!(build_time_series_config(&gps_frame(), &spec).is_none());

        let no_time = Frame::from_reader("lat\n1.0\n".as_bytes(), b',').unwrap();
        assert!(build_time_series_config(&no_time, &PlotSpec::default()).is_none());
    }

    #[test]
    fn single_row_gets_padded_time_range() {
        let frame = Frame::from_reader("timestamp,lat\n35500000,1.0\n".as_bytes(), b',').unwrap();
        let config = build_time_series_config(&frame, &PlotSpec::default()).unwrap();
        assert!(config.x_range.end > config.x_range.start);
    }
}
