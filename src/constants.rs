// src/constants.rs

use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// File naming.
pub const LOG_FILE_EXTENSION: &str = "ulg";
pub const CSV_EXTENSION: &str = "csv";
pub const PLOT_EXTENSION: &str = "png";

// Field every ULog message starts its records with (microseconds).
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

// Default session: latest SITL run, GPS latitude.
pub const DEFAULT_LOGS_ROOT: &str = "build/posix_sitl_default/logs";
pub const DEFAULT_STREAM: &str = "vehicle_gps_position";
pub const DEFAULT_MULTI_ID: u8 = 0;
pub const DEFAULT_SERIES_COLUMN: &str = "lat";
pub const DEFAULT_DELIMITER: char = ',';

// Subtracted from the time axis, in seconds. Only meaningful for the run it was picked for.
pub const DEFAULT_TIME_OFFSET_S: f64 = 35.5;

// Axis labels.
pub const X_AXIS_LABEL: &str = "Time (seconds)";
pub const DEFAULT_Y_AXIS_LABEL: &str = "Latitude";

// --- Plot Color Assignments ---
pub const COLOR_DEFAULT_SERIES: RGBColor = RGBColor(0, 128, 0);

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_LEGEND: u32 = 2;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 16;
pub const FONT_SIZE_LEGEND: i32 = 14;
pub const FONT_SIZE_MESSAGE: i32 = 20;

// Tick label density.
pub const X_LABEL_COUNT: usize = 20;
pub const Y_LABEL_COUNT: usize = 10;

// src/constants.rs
