// src/data_input/mod.rs

pub mod csv_export;
pub mod error;
pub mod frame;
pub mod log_locator;
pub mod summary;
pub mod ulog;

// src/data_input/mod.rs
