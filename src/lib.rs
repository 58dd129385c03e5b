// src/lib.rs - Library interface for internal module access

pub mod constants;
pub mod data_input;
pub mod font_config;
pub mod plot_framework;
pub mod plot_functions;
pub mod series_config;

pub use data_input::csv_export::convert_ulog_to_csv;
pub use data_input::error::{Error, Result};
pub use data_input::frame::Frame;
pub use data_input::log_locator::{find_latest_log, SelectionPolicy};
pub use data_input::ulog::ULog;
