// src/data_input/frame.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, warn};
use ndarray::Array1;

use crate::data_input::error::{Error, Result};

/// Column-oriented view of one converted CSV file.
/// Cells that are not numbers are stored as NaN.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Array1<f64>>,
}

fn parse_cell(cell: &str) -> f64 {
    match cell {
        "true" | "True" => 1.0,
        "false" | "False" => 0.0,
        _ => cell.parse::<f64>().unwrap_or(f64::NAN),
    }
}

impl Frame {
    pub fn from_csv_path(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        let frame = Self::from_reader(BufReader::new(file), delimiter)?;
        debug!(
            "Loaded '{}': {} columns, {} rows",
            path.display(),
            frame.names.len(),
            frame.len()
        );
        Ok(frame)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let names: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut raw: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

        for (row_index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    for (column, cell) in raw.iter_mut().zip(record.iter()) {
                        column.push(parse_cell(cell));
                    }
                }
                Err(e) => {
                    warn!("Skipping row {} due to CSV read error: {}", row_index + 1, e);
                }
            }
        }

        Ok(Frame {
            names,
            columns: raw.into_iter().map(Array1::from).collect(),
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Array1::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn require_column(&self, name: &str) -> Result<&Array1<f64>> {
        self.column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }
}
