// src/series_config.rs

//! Which columns to plot and how: the plotted stream, the time offset and a
//! list of series (column, label, color, stroke width). Built from the
//! command line or from a TOML file.

use std::path::Path;

use plotters::style::colors::{BLACK, BLUE, RED};
use plotters::style::RGBColor;
use serde::Deserialize;

use crate::constants::{
    COLOR_DEFAULT_SERIES, DEFAULT_MULTI_ID, DEFAULT_SERIES_COLUMN, DEFAULT_STREAM,
    DEFAULT_TIME_OFFSET_S, DEFAULT_Y_AXIS_LABEL, LINE_WIDTH_PLOT,
};
use crate::data_input::error::{Error, Result};

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub column: String,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

/// Everything the visualizer needs besides the data.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub stream: String,
    pub multi_id: u8,
    pub title: Option<String>,
    pub y_label: String,
    pub offset_s: f64,
    pub series: Vec<SeriesSpec>,
}

impl Default for PlotSpec {
    fn default() -> Self {
        PlotSpec {
            stream: DEFAULT_STREAM.to_string(),
            multi_id: DEFAULT_MULTI_ID,
            title: None,
            y_label: DEFAULT_Y_AXIS_LABEL.to_string(),
            offset_s: DEFAULT_TIME_OFFSET_S,
            series: vec![SeriesSpec {
                column: DEFAULT_SERIES_COLUMN.to_string(),
                label: DEFAULT_SERIES_COLUMN.to_string(),
                color: COLOR_DEFAULT_SERIES,
                stroke_width: LINE_WIDTH_PLOT,
            }],
        }
    }
}

/// Color for the `index`-th series when none is given.
pub fn palette_color(index: usize) -> RGBColor {
    let c = colorous::CATEGORY10[index % colorous::CATEGORY10.len()];
    RGBColor(c.r, c.g, c.b)
}

/// Parses a matplotlib-style color name or `#rrggbb`.
pub fn parse_color(name: &str) -> Result<RGBColor> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::PlotConfig(format!("bad hex color '{name}'")));
        }
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
        };
        return match (hex.len(), channel(0), channel(2), channel(4)) {
            (6, Some(r), Some(g), Some(b)) => Ok(RGBColor(r, g, b)),
            _ => Err(Error::PlotConfig(format!("bad hex color '{name}'"))),
        };
    }

    let color = match name.to_ascii_lowercase().as_str() {
        "g" | "green" => RGBColor(0, 128, 0),
        "b" | "blue" => BLUE,
        "r" | "red" => RED,
        "k" | "black" => BLACK,
        "y" | "yellow" => RGBColor(191, 191, 0),
        "c" | "cyan" => RGBColor(0, 191, 191),
        "m" | "magenta" => RGBColor(191, 0, 191),
        "purple" => RGBColor(128, 0, 128),
        "orange" => RGBColor(255, 165, 0),
        "lightseagreen" => RGBColor(32, 178, 170),
        _ => return Err(Error::PlotConfig(format!("unknown color '{name}'"))),
    };
    Ok(color)
}

impl SeriesSpec {
    /// Parses `column[:label[:color]]`. Missing label defaults to the column
    /// name, missing color to the `index`-th palette color.
    pub fn parse(spec: &str, index: usize) -> Result<Self> {
        let mut parts = spec.splitn(3, ':');
        let column = parts.next().unwrap_or_default().trim();
        if column.is_empty() {
            return Err(Error::PlotConfig(format!("empty column in series '{spec}'")));
        }
        let label = parts
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(column);
        let color = match parts.next() {
            Some(c) => parse_color(c)?,
            None => palette_color(index),
        };
        Ok(SeriesSpec {
            column: column.to_string(),
            label: label.to_string(),
            color,
            stroke_width: LINE_WIDTH_PLOT,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SeriesFileEntry {
    column: String,
    label: Option<String>,
    color: Option<String>,
    stroke_width: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PlotSpecFile {
    stream: Option<String>,
    multi_id: Option<u8>,
    title: Option<String>,
    y_label: Option<String>,
    offset_s: Option<f64>,
    #[serde(default)]
    series: Vec<SeriesFileEntry>,
}

impl PlotSpec {
    /// Parses a TOML plot description. Keys left out keep their defaults;
    /// an empty series list keeps the default series.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PlotSpecFile = toml::from_str(content)
            .map_err(|e| Error::PlotConfig(format!("Failed to parse plot config: {e}")))?;

        let mut spec = PlotSpec::default();
        if let Some(stream) = file.stream {
            spec.stream = stream;
        }
        if let Some(multi_id) = file.multi_id {
            spec.multi_id = multi_id;
        }
        spec.title = file.title;
        if let Some(y_label) = file.y_label {
            spec.y_label = y_label;
        }
        if let Some(offset_s) = file.offset_s {
            spec.offset_s = offset_s;
        }
        if !file.series.is_empty() {
            spec.series = file
                .series
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    let color = match entry.color.as_deref() {
                        Some(c) => parse_color(c)?,
                        None => palette_color(i),
                    };
                    Ok(SeriesSpec {
                        label: entry.label.unwrap_or_else(|| entry.column.clone()),
                        column: entry.column,
                        color,
                        stroke_width: entry.stroke_width.unwrap_or(LINE_WIDTH_PLOT),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(spec)
    }

    /// Load a plot description from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reproduces_gps_latitude_plot() {
        let spec = PlotSpec::default();
        assert_eq!(spec.stream, "vehicle_gps_position");
        assert_eq!(spec.offset_s, 35.5);
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].column, "lat");
        assert_eq!(spec.series[0].color, RGBColor(0, 128, 0));
    }

    #[test]
    fn parses_color_names_and_hex() {
        assert_eq!(parse_color("g").unwrap(), RGBColor(0, 128, 0));
        assert_eq!(parse_color("Purple").unwrap(), RGBColor(128, 0, 128));
        assert_eq!(parse_color("#20b2aa").unwrap(), RGBColor(32, 178, 170));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#zz0000").is_err());
        assert!(parse_color("#+f+f+f").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn parses_series_spec() {
        let s = SeriesSpec::parse("lon:Longitude:b", 0).unwrap();
        assert_eq!(s.column, "lon");
        assert_eq!(s.label, "Longitude");
        assert_eq!(s.color, BLUE);

        let s = SeriesSpec::parse("alt", 1).unwrap();
        assert_eq!(s.label, "alt");
        assert_eq!(s.color, palette_color(1));

        assert!(SeriesSpec::parse(":label", 0).is_err());
    }

    #[test]
    fn parses_toml_plot_spec() {
        let spec = PlotSpec::from_toml_str(
            r#"
            stream = "vehicle_local_position"
            y-label = "Position (m)"
            offset-s = 0.0

            [[series]]
            column = "x"
            label = "X"
            color = "red"

            [[series]]
            column = "z"
            stroke-width = 3
            "#,
        )
        .unwrap();
        assert_eq!(spec.stream, "vehicle_local_position");
        assert_eq!(spec.multi_id, 0);
        assert_eq!(spec.offset_s, 0.0);
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].color, RED);
        assert_eq!(spec.series[1].label, "z");
        assert_eq!(spec.series[1].stroke_width, 3);
        assert_eq!(spec.series[1].color, palette_color(1));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(
            PlotSpec::from_toml_str("offset-s = \"soon\""),
            Err(Error::PlotConfig(_))
        ));
    }
}
