// src/data_input/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, decoding, converting or loading a log.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No run directory found under '{}'", .0.display())]
    NoRunDirectory(PathBuf),

    #[error("No .ulg file found in '{}'", .0.display())]
    NoLogFile(PathBuf),

    #[error("Not a ULog file: bad header magic")]
    InvalidMagic,

    #[error("Unknown incompatible flag bits set: {0:02x?}")]
    UnknownIncompatFlags([u8; 8]),

    #[error("Invalid format definition: {0}")]
    InvalidFormat(String),

    #[error("Unknown field type '{type_name}' in message '{message}'")]
    UnknownType { message: String, type_name: String },

    #[error("Message type nesting too deep in '{0}'")]
    NestingTooDeep(String),

    #[error("Stream '{0}' has no timestamp field")]
    MissingTimestamp(String),

    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Plot configuration error: {0}")]
    PlotConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
