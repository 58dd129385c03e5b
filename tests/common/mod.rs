// tests/common/mod.rs

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use ulog_csv_render::data_input::ulog::HEADER_MAGIC;

/// Assembles synthetic ULog files message by message.
pub struct ULogBuilder {
    bytes: Vec<u8>,
}

impl ULogBuilder {
    pub fn new() -> Self {
        let mut bytes = HEADER_MAGIC.to_vec();
        bytes.push(1);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        ULogBuilder { bytes }
    }

    pub fn message(mut self, msg_type: u8, payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        self.bytes.push(msg_type);
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn format(self, definition: &str) -> Self {
        self.message(b'F', definition.as_bytes())
    }

    pub fn subscribe(self, msg_id: u16, multi_id: u8, name: &str) -> Self {
        let mut payload = vec![multi_id];
        payload.extend_from_slice(&msg_id.to_le_bytes());
        payload.extend_from_slice(name.as_bytes());
        self.message(b'A', &payload)
    }

    pub fn data(self, msg_id: u16, record: &[u8]) -> Self {
        let mut payload = msg_id.to_le_bytes().to_vec();
        payload.extend_from_slice(record);
        self.message(b'D', &payload)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_to(self, path: &Path) {
        fs::write(path, self.build()).expect("Failed to write synthetic log");
    }
}

/// Concatenates little-endian field encodings into one record.
pub fn record(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// `vehicle_gps_position` with two rows: (1000000, 1.0), (2000000, 2.0).
pub fn gps_log() -> ULogBuilder {
    ULogBuilder::new()
        .format("vehicle_gps_position:uint64_t timestamp;double lat;")
        .subscribe(0, 0, "vehicle_gps_position")
        .data(0, &record(&[&1_000_000u64.to_le_bytes(), &1.0f64.to_le_bytes()]))
        .data(0, &record(&[&2_000_000u64.to_le_bytes(), &2.0f64.to_le_bytes()]))
}
