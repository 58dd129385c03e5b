// src/data_input/summary.rs

use std::fmt::{self, Write};

use crate::data_input::ulog::ULog;

/// Human-readable overview of a decoded log: header, info records, message
/// counts and one line per stream.
pub fn format_log_summary(ulog: &ULog) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_log_summary(&mut out, ulog)?;
    Ok(out)
}

/// Writes the summary of `ulog` into any formatter sink.
pub fn write_log_summary<W: Write>(out: &mut W, ulog: &ULog) -> fmt::Result {
    writeln!(out, "ULog version {}, start {} us", ulog.file_version, ulog.start_timestamp)?;

    if !ulog.info.is_empty() {
        writeln!(out, "Info:")?;
        for (key, value) in &ulog.info {
            writeln!(out, "  {key}: {value}")?;
        }
    }

    let counts: Vec<String> = ulog
        .message_counts
        .iter()
        .map(|(t, n)| format!("{t}={n}"))
        .collect();
    writeln!(out, "Messages: {}", counts.join(" "))?;
    writeln!(
        out,
        "Parameters: {} initial, {} changed; {} logged messages; {} dropouts",
        ulog.initial_parameters.len(),
        ulog.changed_parameters.len(),
        ulog.logged_messages.len(),
        ulog.dropouts.len()
    )?;

    writeln!(out, "Streams:")?;
    for stream in &ulog.data_list {
        writeln!(
            out,
            "  {} [{}]: {} records, {} fields",
            stream.name,
            stream.multi_id,
            stream.len(),
            stream.field_data.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::ulog::{InfoValue, Value};

    #[test]
    fn summary_lists_info_and_counts() {
        let mut ulog = ULog::default();
        ulog.file_version = 1;
        ulog.info.insert("sys_name".to_string(), InfoValue::Text("PX4".to_string()));
        ulog.info.insert("ver_hw".to_string(), InfoValue::Scalar(Value::UInt(3)));
        ulog.message_counts.insert('F', 2);
        ulog.message_counts.insert('D', 10);
        ulog.dropouts.push(100);

        let summary = format_log_summary(&ulog).unwrap();
        assert!(summary.contains("ULog version 1"));
        assert!(summary.contains("  sys_name: PX4"));
        assert!(summary.contains("  ver_hw: 3"));
        assert!(summary.contains("Messages: D=10 F=2"));
        assert!(summary.contains("1 dropouts"));
    }

    #[test]
    fn summary_writes_into_any_sink() {
        let ulog = ULog::default();
        let mut out = String::new();
        write_log_summary(&mut out, &ulog).unwrap();
        assert_eq!(out, format_log_summary(&ulog).unwrap());
        assert!(out.ends_with("Streams:\n"));
    }
}
