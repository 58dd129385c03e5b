// src/plot_framework.rs

use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::ops::Range;

use log::info;

use crate::constants::{
    FONT_SIZE_MESSAGE, LINE_WIDTH_LEGEND, PLOT_HEIGHT, PLOT_WIDTH, X_LABEL_COUNT, Y_LABEL_COUNT,
};
use crate::font_config::{
    FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND, FONT_TUPLE_MAIN_TITLE,
    FONT_TUPLE_MESSAGE,
};

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Tick label text for a value on an axis spanning `span`.
///
/// Large magnitudes use k/M notation when the span is wide enough that
/// neighbouring ticks stay distinct; otherwise enough decimals are kept to
/// tell ticks apart.
pub fn format_tick_label(value: f64, span: f64) -> String {
    let span = span.abs();
    if !value.is_finite() || !span.is_finite() || span == 0.0 {
        return format!("{value}");
    }
    if value.abs() >= 1_000_000.0 && span >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1000.0 && span >= 10_000.0 {
        format!("{:.0}k", value / 1000.0)
    } else if span >= 10.0 {
        format!("{value:.0}")
    } else {
        let decimals = (-(span / 10.0).log10()).ceil().clamp(1.0, 9.0) as usize;
        format!("{value:.decimals$}")
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_type: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    // Constants for text rendering
    const CHAR_WIDTH_RATIO: f32 = 0.6; // Approximate character width relative to font size
    const LINE_HEIGHT_SPACING: i32 = 4; // Additional spacing between lines

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (
        (x_range.end - x_range.start) as u32,
        (y_range.end - y_range.start) as u32,
    );
    let message = format!("{plot_type} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;

    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let center_x = width as i32 / 2 - estimated_text_width / 2;
    let center_y = height as i32 / 2 - estimated_text_height / 2;

    let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))?;
    Ok(())
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

#[derive(Clone)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
}

/// Draws one chart from a PlotConfig, legend in the upper-left corner.
fn draw_single_axis_chart_with_config(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_config: &PlotConfig,
) -> Result<(), Box<dyn Error>> {
    let x_span = plot_config.x_range.end - plot_config.x_range.start;
    let y_span = plot_config.y_range.end - plot_config.y_range.start;

    let mut chart = ChartBuilder::on(area)
        .caption(&plot_config.title, FONT_TUPLE_CHART_TITLE)
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(plot_config.x_range.clone(), plot_config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&plot_config.x_label)
        .y_desc(&plot_config.y_label)
        .x_labels(X_LABEL_COUNT)
        .y_labels(Y_LABEL_COUNT)
        .x_label_formatter(&|x| format_tick_label(*x, x_span))
        .y_label_formatter(&|y| format_tick_label(*y, y_span))
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let mut legend_series_count = 0;
    for s in plot_config.series.iter().filter(|s| !s.data.is_empty()) {
        let series = chart.draw_series(LineSeries::new(
            s.data.iter().cloned(),
            s.color.stroke_width(s.stroke_width),
        ))?;

        if !s.label.is_empty() {
            series.label(&s.label).legend(move |(x, y)| {
                PathElement::new(
                    vec![(x, y), (x + 20, y)],
                    s.color.stroke_width(LINE_WIDTH_LEGEND),
                )
            });
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_TUPLE_LEGEND)
            .draw()?;
    }

    Ok(())
}

/// Creates a single-chart plot image.
///
/// `get_plot_config` returns `None` when there is nothing to draw; a
/// placeholder message is rendered instead. Returns whether a chart was drawn.
pub fn draw_single_plot<'a, F>(
    output_filename: &'a str,
    root_name: &str,
    plot_type_name: &str,
    get_plot_config: F,
) -> Result<bool, Box<dyn Error>>
where
    F: FnOnce() -> Option<PlotConfig>,
    <BitMapBackend<'a> as DrawingBackend>::ErrorType: 'static,
{
    let root_area =
        BitMapBackend::new(output_filename, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        FONT_TUPLE_MAIN_TITLE.into_font().color(&BLACK),
    ))?;
    let area = root_area.margin(50, 5, 5, 5);

    let plotted = match get_plot_config() {
        Some(plot_config) => {
            let has_data = plot_config.series.iter().any(|s| !s.data.is_empty());
            let valid_ranges = plot_config.x_range.end > plot_config.x_range.start
                && plot_config.y_range.end > plot_config.y_range.start;
            if has_data && valid_ranges {
                draw_single_axis_chart_with_config(&area, &plot_config)?;
                true
            } else {
                let reason = if !has_data {
                    "No data points"
                } else {
                    "Invalid ranges"
                };
                draw_unavailable_message(&area, plot_type_name, reason)?;
                false
            }
        }
        None => {
            draw_unavailable_message(&area, plot_type_name, "No plottable columns")?;
            false
        }
    };

    root_area.present()?;
    if plotted {
        info!("Plot saved as '{output_filename}'.");
    } else {
        info!("Plot '{output_filename}' saved with a placeholder message only: no data available.");
    }
    Ok(plotted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_padded() {
        let (min, max) = calculate_range(0.0, 10.0);
        assert!((min + 1.5).abs() < 1e-12);
        assert!((max - 11.5).abs() < 1e-12);
    }

    #[test]
    fn flat_range_gets_fixed_padding() {
        assert_eq!(calculate_range(2.0, 2.0), (1.5, 2.5));
    }

    #[test]
    fn swapped_bounds_are_ordered() {
        let (min, max) = calculate_range(5.0, -5.0);
        assert!(min < -5.0 && max > 5.0);
    }
}
