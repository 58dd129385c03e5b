// src/data_input/ulog/mod.rs

//! Minimal reader for PX4 ULog files.
//!
//! Decodes the definitions section (formats, info, parameters) and the data
//! section (subscriptions, data records, logged strings, dropouts) into
//! column-oriented streams. Only what the CSV converter and the stream
//! listing need is kept.

pub mod definitions;
pub mod value;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::data_input::error::{Error, Result};
use definitions::{flatten_format, split_array_type, FlatField, MessageFormat, PrimitiveType};
pub use value::Value;

/// `ULog` followed by the fixed magic bytes.
pub const HEADER_MAGIC: [u8; 7] = [0x55, 0x4c, 0x6f, 0x67, 0x01, 0x12, 0x35];
pub const HEADER_LEN: usize = 16;
const MESSAGE_HEADER_LEN: usize = 3;

/// Incompatible flag bit 0: the log has appended data sections.
const INCOMPAT_FLAG_DATA_APPENDED: u8 = 0x01;

/// A flattened column of a data stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    pub field_name: String,
    pub primitive: PrimitiveType,
}

/// All records of one subscription (stream name + multi id).
#[derive(Debug, Clone)]
pub struct DataStream {
    pub name: String,
    pub multi_id: u8,
    pub msg_id: u16,
    pub field_data: Vec<FieldData>,
    columns: Vec<Vec<Value>>,
}

impl DataStream {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column `index` of `field_data`.
    pub fn column_at(&self, index: usize) -> &[Value] {
        &self.columns[index]
    }

    pub fn column(&self, field_name: &str) -> Option<&[Value]> {
        self.field_data
            .iter()
            .position(|f| f.field_name == field_name)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Value of an info, multi-info or parameter record.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Scalar(Value),
    Array(Vec<Value>),
    Text(String),
}

impl std::fmt::Display for InfoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfoValue::Scalar(v) => write!(f, "{v}"),
            InfoValue::Array(values) => {
                let joined: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            InfoValue::Text(s) => f.write_str(s),
        }
    }
}

/// A logged string (`L` or tagged `C` record).
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMessage {
    pub log_level: u8,
    pub tag: Option<u16>,
    pub timestamp: u64,
    pub message: String,
}

/// A parameter change recorded in the data section.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub timestamp: u64,
    pub name: String,
    pub value: InfoValue,
}

struct Subscription {
    stream_index: usize,
    fields: Vec<FlatField>,
    record_size: usize,
}

/// A decoded ULog file.
#[derive(Debug, Clone, Default)]
pub struct ULog {
    pub file_version: u8,
    pub start_timestamp: u64,
    pub compat_flags: [u8; 8],
    pub incompat_flags: [u8; 8],
    pub formats: HashMap<String, MessageFormat>,
    /// Streams with at least one record, in subscription order.
    pub data_list: Vec<DataStream>,
    pub info: BTreeMap<String, InfoValue>,
    pub multi_info: BTreeMap<String, Vec<Vec<InfoValue>>>,
    pub initial_parameters: BTreeMap<String, InfoValue>,
    pub default_parameters: BTreeMap<String, InfoValue>,
    pub changed_parameters: Vec<ParameterChange>,
    pub logged_messages: Vec<LoggedMessage>,
    /// Dropout durations in milliseconds.
    pub dropouts: Vec<u16>,
    /// Count of records per message type byte.
    pub message_counts: BTreeMap<char, usize>,
}

impl ULog {
    /// Reads and decodes `path`. With `message_filter`, only streams whose
    /// name is listed are decoded; unknown names are ignored.
    pub fn from_path(path: &Path, message_filter: Option<&[String]>) -> Result<Self> {
        let bytes = fs::read(path)?;
        debug!("Read {} bytes from '{}'", bytes.len(), path.display());
        Self::from_bytes(&bytes, message_filter)
    }

    pub fn from_bytes(bytes: &[u8], message_filter: Option<&[String]>) -> Result<Self> {
        if bytes.len() < HEADER_LEN || bytes[..HEADER_MAGIC.len()] != HEADER_MAGIC {
            return Err(Error::InvalidMagic);
        }

        let mut ulog = ULog {
            file_version: bytes[7],
            start_timestamp: LittleEndian::read_u64(&bytes[8..16]),
            ..Default::default()
        };
        let filter: Option<HashSet<&str>> =
            message_filter.map(|names| names.iter().map(String::as_str).collect());

        let mut streams: Vec<DataStream> = Vec::new();
        let mut subscriptions: HashMap<u16, Subscription> = HashMap::new();
        let mut ignored_ids: HashSet<u16> = HashSet::new();
        let mut in_data_section = false;
        let mut last_timestamp: u64 = ulog.start_timestamp;

        let mut pos = HEADER_LEN;
        while pos + MESSAGE_HEADER_LEN <= bytes.len() {
            let msg_size = LittleEndian::read_u16(&bytes[pos..pos + 2]) as usize;
            let msg_type = bytes[pos + 2];
            let start = pos + MESSAGE_HEADER_LEN;
            let end = start + msg_size;
            if end > bytes.len() {
                warn!(
                    "Truncated '{}' message at offset {} ({} of {} bytes), stopping",
                    msg_type as char,
                    pos,
                    bytes.len() - start,
                    msg_size
                );
                break;
            }
            let payload = &bytes[start..end];
            pos = end;
            *ulog.message_counts.entry(msg_type as char).or_insert(0) += 1;

            match msg_type {
                b'B' => ulog.read_flag_bits(payload)?,
                b'F' => {
                    let format = MessageFormat::parse(&String::from_utf8_lossy(payload))?;
                    debug!("Format '{}' with {} fields", format.name, format.fields.len());
                    ulog.formats.insert(format.name.clone(), format);
                }
                b'I' => {
                    if let Some((key, value)) = read_key_value(payload)? {
                        ulog.info.insert(key, value);
                    }
                }
                b'M' => {
                    if payload.is_empty() {
                        continue;
                    }
                    let is_continued = payload[0] != 0;
                    if let Some((key, value)) = read_key_value(&payload[1..])? {
                        let entries = ulog.multi_info.entry(key).or_default();
                        match entries.last_mut() {
                            Some(last) if is_continued => last.push(value),
                            _ => entries.push(vec![value]),
                        }
                    }
                }
                b'P' => {
                    if let Some((key, value)) = read_key_value(payload)? {
                        if in_data_section {
                            ulog.changed_parameters.push(ParameterChange {
                                timestamp: last_timestamp,
                                name: key,
                                value,
                            });
                        } else {
                            ulog.initial_parameters.insert(key, value);
                        }
                    }
                }
                b'Q' => {
                    if payload.is_empty() {
                        continue;
                    }
                    if let Some((key, value)) = read_key_value(&payload[1..])? {
                        ulog.default_parameters.insert(key, value);
                    }
                }
                b'A' => {
                    in_data_section = true;
                    if payload.len() < 3 {
                        warn!("Short subscription record at offset {}", start);
                        continue;
                    }
                    let multi_id = payload[0];
                    let msg_id = LittleEndian::read_u16(&payload[1..3]);
                    let name = String::from_utf8_lossy(&payload[3..]).to_string();

                    let wanted = filter.as_ref().map_or(true, |f| f.contains(name.as_str()));
                    if !wanted {
                        ignored_ids.insert(msg_id);
                        continue;
                    }
                    ignored_ids.remove(&msg_id);

                    let (fields, record_size) = flatten_format(&ulog.formats, &name)?;
                    debug!(
                        "Subscription {} -> '{}' multi_id {} ({} columns, {} bytes)",
                        msg_id,
                        name,
                        multi_id,
                        fields.len(),
                        record_size
                    );
                    streams.push(DataStream {
                        name,
                        multi_id,
                        msg_id,
                        field_data: fields
                            .iter()
                            .map(|f| FieldData {
                                field_name: f.name.clone(),
                                primitive: f.primitive,
                            })
                            .collect(),
                        columns: vec![Vec::new(); fields.len()],
                    });
                    subscriptions.insert(
                        msg_id,
                        Subscription {
                            stream_index: streams.len() - 1,
                            fields,
                            record_size,
                        },
                    );
                }
                b'R' => {
                    if payload.len() >= 2 {
                        let msg_id = LittleEndian::read_u16(&payload[..2]);
                        subscriptions.remove(&msg_id);
                        ignored_ids.remove(&msg_id);
                    }
                }
                b'D' => {
                    in_data_section = true;
                    if payload.len() < 2 {
                        continue;
                    }
                    let msg_id = LittleEndian::read_u16(&payload[..2]);
                    let record = &payload[2..];
                    let Some(sub) = subscriptions.get(&msg_id) else {
                        if !ignored_ids.contains(&msg_id) {
                            warn!("Data for unknown subscription {} at offset {}", msg_id, start);
                        }
                        continue;
                    };
                    if record.len() < sub.record_size {
                        warn!(
                            "Short data record for subscription {} ({} < {} bytes), skipping",
                            msg_id,
                            record.len(),
                            sub.record_size
                        );
                        continue;
                    }
                    let stream = &mut streams[sub.stream_index];
                    for (column, field) in stream.columns.iter_mut().zip(&sub.fields) {
                        let value = field.primitive.decode(&record[field.offset..]);
                        if field.name == "timestamp" {
                            if let Value::UInt(t) = value {
                                last_timestamp = t;
                            }
                        }
                        column.push(value);
                    }
                }
                b'L' => {
                    in_data_section = true;
                    if payload.len() < 9 {
                        continue;
                    }
                    let timestamp = LittleEndian::read_u64(&payload[1..9]);
                    ulog.logged_messages.push(LoggedMessage {
                        log_level: payload[0],
                        tag: None,
                        timestamp,
                        message: String::from_utf8_lossy(&payload[9..]).to_string(),
                    });
                }
                b'C' => {
                    in_data_section = true;
                    if payload.len() < 11 {
                        continue;
                    }
                    let timestamp = LittleEndian::read_u64(&payload[3..11]);
                    ulog.logged_messages.push(LoggedMessage {
                        log_level: payload[0],
                        tag: Some(LittleEndian::read_u16(&payload[1..3])),
                        timestamp,
                        message: String::from_utf8_lossy(&payload[11..]).to_string(),
                    });
                }
                b'O' => {
                    if payload.len() >= 2 {
                        ulog.dropouts.push(LittleEndian::read_u16(&payload[..2]));
                    }
                }
                b'S' => {}
                other => debug!("Skipping message type {:#04x} at offset {}", other, start),
            }
        }

        let (kept, empty): (Vec<DataStream>, Vec<DataStream>) =
            streams.into_iter().partition(|s| !s.is_empty());
        for s in &empty {
            debug!("Stream '{}' multi_id {} has no data, dropped", s.name, s.multi_id);
        }
        ulog.data_list = kept;
        Ok(ulog)
    }

    fn read_flag_bits(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() < 16 {
            warn!("Short flag bits record ({} bytes), ignoring", payload.len());
            return Ok(());
        }
        self.compat_flags.copy_from_slice(&payload[0..8]);
        self.incompat_flags.copy_from_slice(&payload[8..16]);

        let mut unknown = self.incompat_flags;
        unknown[0] &= !INCOMPAT_FLAG_DATA_APPENDED;
        if unknown.iter().any(|&b| b != 0) {
            return Err(Error::UnknownIncompatFlags(self.incompat_flags));
        }
        Ok(())
    }

    /// Looks up a stream by name and multi id.
    pub fn stream(&self, name: &str, multi_id: u8) -> Option<&DataStream> {
        self.data_list
            .iter()
            .find(|d| d.name == name && d.multi_id == multi_id)
    }
}

/// Decodes the `key_len, "type name", value` layout shared by info and
/// parameter records. Returns `None` for records too short to hold a key.
fn read_key_value(payload: &[u8]) -> Result<Option<(String, InfoValue)>> {
    let Some((&key_len, rest)) = payload.split_first() else {
        return Ok(None);
    };
    let key_len = key_len as usize;
    if rest.len() < key_len {
        return Ok(None);
    }
    let key = String::from_utf8_lossy(&rest[..key_len]).to_string();
    let value_bytes = &rest[key_len..];

    let (type_str, name) = key
        .split_once(' ')
        .ok_or_else(|| Error::InvalidFormat(format!("bad info key '{key}'")))?;
    let (base, array_len) = split_array_type(type_str)?;

    let value = match (PrimitiveType::from_type_name(base), array_len) {
        (Some(PrimitiveType::Char), Some(_)) | (None, _) => InfoValue::Text(
            String::from_utf8_lossy(value_bytes)
                .trim_end_matches('\0')
                .to_string(),
        ),
        (Some(primitive), None) if value_bytes.len() >= primitive.size() => {
            InfoValue::Scalar(primitive.decode(value_bytes))
        }
        (Some(primitive), Some(_)) => InfoValue::Array(
            value_bytes
                .chunks_exact(primitive.size())
                .map(|chunk| primitive.decode(chunk))
                .collect(),
        ),
        (Some(_), None) => InfoValue::Text(String::new()),
    };

    Ok(Some((name.to_string(), value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(msg_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as u16).to_le_bytes().to_vec();
        out.push(msg_type);
        out.extend_from_slice(payload);
        out
    }

    fn header() -> Vec<u8> {
        let mut out = HEADER_MAGIC.to_vec();
        out.push(1);
        out.extend_from_slice(&42u64.to_le_bytes());
        out
    }

    fn key_value(key: &str, value: &[u8]) -> Vec<u8> {
        let mut out = vec![key.len() as u8];
        out.extend_from_slice(key.as_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(ULog::from_bytes(b"not a ulog file!", None), Err(Error::InvalidMagic)));
        assert!(matches!(ULog::from_bytes(b"ULog", None), Err(Error::InvalidMagic)));
    }

    #[test]
    fn reads_header_and_info() {
        let mut bytes = header();
        bytes.extend(message(b'I', &key_value("char[5] sys_name", b"PX4\0\0")));
        bytes.extend(message(b'I', &key_value("uint32_t ver_hw", &7u32.to_le_bytes())));
        bytes.extend(message(b'P', &key_value("float MC_ROLL_P", &6.5f32.to_le_bytes())));

        let ulog = ULog::from_bytes(&bytes, None).unwrap();
        assert_eq!(ulog.file_version, 1);
        assert_eq!(ulog.start_timestamp, 42);
        assert_eq!(ulog.info["sys_name"], InfoValue::Text("PX4".to_string()));
        assert_eq!(ulog.info["ver_hw"], InfoValue::Scalar(Value::UInt(7)));
        assert_eq!(ulog.initial_parameters["MC_ROLL_P"], InfoValue::Scalar(Value::Float(6.5)));
        assert!(ulog.data_list.is_empty());
    }

    #[test]
    fn unknown_incompat_flags_are_rejected() {
        let mut flags = vec![0u8; 40];
        flags[8] = INCOMPAT_FLAG_DATA_APPENDED;
        let mut bytes = header();
        bytes.extend(message(b'B', &flags));
        assert!(ULog::from_bytes(&bytes, None).is_ok());

        flags[9] = 0x01;
        let mut bytes = header();
        bytes.extend(message(b'B', &flags));
        assert!(matches!(
            ULog::from_bytes(&bytes, None),
            Err(Error::UnknownIncompatFlags(_))
        ));
    }

    #[test]
    fn truncated_trailing_message_is_tolerated() {
        let mut bytes = header();
        bytes.extend(message(b'F', b"m:uint64_t timestamp;"));
        let mut partial = message(b'I', &key_value("int32_t x", &1i32.to_le_bytes()));
        partial.truncate(6);
        bytes.extend(partial);

        let ulog = ULog::from_bytes(&bytes, None).unwrap();
        assert!(ulog.formats.contains_key("m"));
        assert!(ulog.info.is_empty());
    }

    #[test]
    fn logged_messages_and_dropouts() {
        let mut logged = vec![6u8];
        logged.extend_from_slice(&1234u64.to_le_bytes());
        logged.extend_from_slice(b"Takeoff detected");

        let mut bytes = header();
        bytes.extend(message(b'L', &logged));
        bytes.extend(message(b'O', &250u16.to_le_bytes()));

        let ulog = ULog::from_bytes(&bytes, None).unwrap();
        assert_eq!(ulog.logged_messages.len(), 1);
        assert_eq!(ulog.logged_messages[0].timestamp, 1234);
        assert_eq!(ulog.logged_messages[0].message, "Takeoff detected");
        assert_eq!(ulog.dropouts, vec![250]);
        assert_eq!(ulog.message_counts[&'L'], 1);
    }

    #[test]
    fn decodes_subscribed_data() {
        let mut sub = vec![0u8];
        sub.extend_from_slice(&3u16.to_le_bytes());
        sub.extend_from_slice(b"m");

        let mut bytes = header();
        bytes.extend(message(b'F', b"m:int32_t x;uint64_t timestamp;"));
        bytes.extend(message(b'A', &sub));
        for (x, t) in [(-5i32, 100u64), (7, 200)] {
            let mut data = 3u16.to_le_bytes().to_vec();
            data.extend_from_slice(&x.to_le_bytes());
            data.extend_from_slice(&t.to_le_bytes());
            bytes.extend(message(b'D', &data));
        }
        // too short, skipped
        bytes.extend(message(b'D', &[3, 0, 1]));

        let ulog = ULog::from_bytes(&bytes, None).unwrap();
        let stream = ulog.stream("m", 0).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.column("x").unwrap(), &[Value::Int(-5), Value::Int(7)]);
        assert_eq!(stream.column("timestamp").unwrap(), &[Value::UInt(100), Value::UInt(200)]);
    }
}
