// src/data_input/csv_export.rs

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::info;

use crate::constants::{CSV_EXTENSION, TIMESTAMP_FIELD};
use crate::data_input::error::{Error, Result};
use crate::data_input::ulog::{DataStream, ULog, Value};

/// Converts a delimiter character into the single byte the CSV layer needs.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(Error::InvalidDelimiter(delimiter))
    }
}

/// Splits a comma-separated stream allow-list. `None`, or a list with no
/// names in it, means all streams.
pub fn parse_message_filter(messages: Option<&str>) -> Option<Vec<String>> {
    messages
        .map(|m| {
            m.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|names| !names.is_empty())
}

/// Output prefix for a log: the input path minus a trailing `.ulg`
/// (any case), relocated into `output_dir` when given.
pub fn output_prefix(ulog_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = ulog_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let split = file_name.len().saturating_sub(4);
    let stem = match file_name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".ulg") => file_name[..split].to_string(),
        _ => file_name,
    };

    match output_dir {
        Some(dir) => dir.join(stem),
        None => ulog_path.with_file_name(stem),
    }
}

/// `<prefix>_<stream>_<multi_id>.<extension>`
pub fn artifact_path(prefix: &Path, stream_name: &str, multi_id: u8, extension: &str) -> PathBuf {
    let stem = prefix
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    prefix.with_file_name(format!("{stem}_{stream_name}_{multi_id}.{extension}"))
}

/// Column order for a stream: source order with `timestamp` moved to the front.
/// Returns indices into `stream.field_data`.
pub fn column_order(stream: &DataStream) -> Result<Vec<usize>> {
    let timestamp_index = stream
        .field_data
        .iter()
        .position(|f| f.field_name == TIMESTAMP_FIELD)
        .ok_or_else(|| Error::MissingTimestamp(stream.name.clone()))?;

    let mut order = vec![timestamp_index];
    order.extend(
        stream
            .field_data
            .iter()
            .enumerate()
            .filter(|(_, f)| f.field_name != TIMESTAMP_FIELD)
            .map(|(i, _)| i),
    );
    Ok(order)
}

/// Writes one stream as delimited text. Values use their default textual
/// form and are never quoted.
pub fn write_stream_csv(stream: &DataStream, output_file: &Path, delimiter: u8) -> Result<()> {
    let order = column_order(stream)?;
    let columns: Vec<&[Value]> = order.iter().map(|&i| stream.column_at(i)).collect();

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_path(output_file)?;

    writer.write_record(order.iter().map(|&i| stream.field_data[i].field_name.as_str()))?;
    for row in 0..stream.len() {
        writer.write_record(columns.iter().map(|col| col[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Converts a ULog file into one CSV file per stream.
///
/// * `messages` - comma-separated stream names; `None` converts every stream.
///   Names not present in the log are ignored.
/// * `output_dir` - target directory; `None` writes next to the log.
///
/// Returns the written files in stream order.
pub fn convert_ulog_to_csv(
    ulog_path: &Path,
    messages: Option<&str>,
    output_dir: Option<&Path>,
    delimiter: char,
) -> Result<Vec<PathBuf>> {
    let delimiter = delimiter_byte(delimiter)?;
    let filter = parse_message_filter(messages);
    let ulog = ULog::from_path(ulog_path, filter.as_deref())?;
    write_ulog_csv(&ulog, ulog_path, output_dir, delimiter)
}

/// Writes every stream of an already decoded log.
pub fn write_ulog_csv(
    ulog: &ULog,
    ulog_path: &Path,
    output_dir: Option<&Path>,
    delimiter: u8,
) -> Result<Vec<PathBuf>> {
    let prefix = output_prefix(ulog_path, output_dir);
    let mut written = Vec::with_capacity(ulog.data_list.len());
    for stream in &ulog.data_list {
        let output_file = artifact_path(&prefix, &stream.name, stream.multi_id, CSV_EXTENSION);
        info!("Writing {} ({} data points)", output_file.display(), stream.len());
        write_stream_csv(stream, &output_file, delimiter)?;
        written.push(output_file);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_strips_ulg_any_case() {
        assert_eq!(output_prefix(Path::new("/logs/run/12_00.ulg"), None), PathBuf::from("/logs/run/12_00"));
        assert_eq!(output_prefix(Path::new("/logs/run/12_00.ULG"), None), PathBuf::from("/logs/run/12_00"));
        assert_eq!(output_prefix(Path::new("/logs/run/data.bin"), None), PathBuf::from("/logs/run/data.bin"));
    }

    #[test]
    fn prefix_moves_into_output_dir() {
        assert_eq!(
            output_prefix(Path::new("/logs/run/12_00.ulg"), Some(Path::new("/tmp/out"))),
            PathBuf::from("/tmp/out/12_00")
        );
    }

    #[test]
    fn artifact_name_convention() {
        let prefix = PathBuf::from("/logs/run/12_00");
        assert_eq!(
            artifact_path(&prefix, "vehicle_gps_position", 0, "csv"),
            PathBuf::from("/logs/run/12_00_vehicle_gps_position_0.csv")
        );
    }

    #[test]
    fn message_filter_parsing() {
        assert_eq!(parse_message_filter(None), None);
        assert_eq!(parse_message_filter(Some("")), None);
        assert_eq!(parse_message_filter(Some(" , ")), None);
        assert_eq!(
            parse_message_filter(Some("a, b,,c")),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(matches!(delimiter_byte('§'), Err(Error::InvalidDelimiter('§'))));
    }
}
