// src/plot_functions/mod.rs

pub mod plot_time_series;

// src/plot_functions/mod.rs
