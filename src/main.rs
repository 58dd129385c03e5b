// src/main.rs

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};

use ulog_csv_render::constants::{
    CSV_EXTENSION, DEFAULT_DELIMITER, DEFAULT_LOGS_ROOT, DEFAULT_STREAM, PLOT_EXTENSION,
};
use ulog_csv_render::data_input::csv_export::{
    artifact_path, convert_ulog_to_csv, delimiter_byte, output_prefix,
};
use ulog_csv_render::data_input::frame::Frame;
use ulog_csv_render::data_input::log_locator::{find_latest_log, SelectionPolicy};
use ulog_csv_render::data_input::summary::format_log_summary;
use ulog_csv_render::data_input::ulog::ULog;
use ulog_csv_render::plot_functions::plot_time_series::plot_time_series;
use ulog_csv_render::series_config::{PlotSpec, SeriesSpec};

/// Converts the latest SITL flight log to CSV and plots one stream against time.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Command {
    /// Directory holding one subdirectory per run.
    #[arg(long, default_value = DEFAULT_LOGS_ROOT)]
    logs_root: PathBuf,
    /// Use this log file instead of locating the latest one.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Timestamp that decides which run and log are the latest.
    #[arg(long, value_enum, default_value_t = SelectionPolicy::Created)]
    selection: SelectionPolicy,
    /// Comma-separated streams to convert, or "all".
    #[arg(short, long, default_value = DEFAULT_STREAM)]
    messages: String,
    /// Write CSV files here instead of next to the log.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// CSV field delimiter (single ASCII character).
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,
    /// Stream to plot.
    #[arg(long)]
    stream: Option<String>,
    /// Instance of the plotted stream.
    #[arg(long)]
    multi_id: Option<u8>,
    /// Seconds subtracted from the time axis.
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<f64>,
    /// Y axis label.
    #[arg(long)]
    y_label: Option<String>,
    /// Plotted series as column[:label[:color]]; repeatable.
    #[arg(long)]
    series: Vec<String>,
    /// TOML file describing the plot.
    #[arg(long)]
    plot_config: Option<PathBuf>,
    /// PNG output path.
    #[arg(long)]
    output_plot: Option<PathBuf>,
    /// Print the streams and info records of the log, then exit.
    #[arg(long)]
    list: bool,
    /// Debug logging for this tool.
    #[arg(short, long)]
    verbose: bool,
}

impl Command {
    fn plot_spec(&self) -> Result<PlotSpec, Box<dyn Error>> {
        let mut spec = match &self.plot_config {
            Some(path) => PlotSpec::load(path)?,
            None => PlotSpec::default(),
        };
        if let Some(stream) = &self.stream {
            spec.stream = stream.clone();
        }
        if let Some(multi_id) = self.multi_id {
            spec.multi_id = multi_id;
        }
        if let Some(offset) = self.offset {
            spec.offset_s = offset;
        }
        if let Some(y_label) = &self.y_label {
            spec.y_label = y_label.clone();
        }
        if !self.series.is_empty() {
            spec.series = self
                .series
                .iter()
                .enumerate()
                .map(|(i, s)| SeriesSpec::parse(s, i))
                .collect::<Result<Vec<_>, _>>()?;
        }
        Ok(spec)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Command::parse();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(
            Some("ulog_csv_render"),
            if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .parse_default_env()
        .init();

    // --- Locate ---
    let log_path = match &args.log {
        Some(path) => path.clone(),
        None => find_latest_log(&args.logs_root, args.selection)?,
    };
    let prefix = output_prefix(&log_path, args.output_dir.as_deref());
    println!("{}", prefix.display());

    if args.list {
        let ulog = ULog::from_path(&log_path, None)?;
        print!("{}", format_log_summary(&ulog)?);
        return Ok(());
    }

    // --- Convert ---
    let messages = match args.messages.as_str() {
        "all" => None,
        m => Some(m),
    };
    let written = convert_ulog_to_csv(&log_path, messages, args.output_dir.as_deref(), args.delimiter)?;
    info!("Converted {} stream(s)", written.len());

    // --- Plot ---
    let plot_spec = args.plot_spec()?;
    let csv_path = artifact_path(&prefix, &plot_spec.stream, plot_spec.multi_id, CSV_EXTENSION);
    if !written.contains(&csv_path) {
        return Err(format!(
            "Stream '{}' instance {} was not converted (not in the log, or not listed in --messages)",
            plot_spec.stream, plot_spec.multi_id
        )
        .into());
    }
    let frame = Frame::from_csv_path(&csv_path, delimiter_byte(args.delimiter)?)?;

    let plot_path = args
        .output_plot
        .clone()
        .unwrap_or_else(|| artifact_path(&prefix, &plot_spec.stream, plot_spec.multi_id, PLOT_EXTENSION));
    let root_name = log_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    if plot_time_series(&frame, &plot_spec, &plot_path, &root_name)? {
        println!("Plot saved as '{}'.", plot_path.display());
    } else {
        println!(
            "No plottable data in '{}'; placeholder written to '{}'.",
            csv_path.display(),
            plot_path.display()
        );
    }

    Ok(())
}

// src/main.rs
