// src/data_input/ulog/definitions.rs

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::data_input::error::{Error, Result};
use crate::data_input::ulog::value::Value;

/// Nested message types deeper than this are treated as a malformed log.
const MAX_NESTING_DEPTH: usize = 16;

/// Field names with this prefix only occupy space in the payload.
const PADDING_PREFIX: &str = "_padding";

/// Message sizes are `u16`, so no record can be larger.
const MAX_RECORD_SIZE: usize = u16::MAX as usize;

/// Primitive field types of the ULog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Bool,
    Char,
}

impl PrimitiveType {
    pub fn from_type_name(name: &str) -> Option<Self> {
        let t = match name {
            "int8_t" => PrimitiveType::Int8,
            "uint8_t" => PrimitiveType::UInt8,
            "int16_t" => PrimitiveType::Int16,
            "uint16_t" => PrimitiveType::UInt16,
            "int32_t" => PrimitiveType::Int32,
            "uint32_t" => PrimitiveType::UInt32,
            "int64_t" => PrimitiveType::Int64,
            "uint64_t" => PrimitiveType::UInt64,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            "bool" => PrimitiveType::Bool,
            "char" => PrimitiveType::Char,
            _ => return None,
        };
        Some(t)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveType::Int8 => "int8_t",
            PrimitiveType::UInt8 => "uint8_t",
            PrimitiveType::Int16 => "int16_t",
            PrimitiveType::UInt16 => "uint16_t",
            PrimitiveType::Int32 => "int32_t",
            PrimitiveType::UInt32 => "uint32_t",
            PrimitiveType::Int64 => "int64_t",
            PrimitiveType::UInt64 => "uint64_t",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
        }
    }

    /// Size in bytes of one element.
    pub fn size(self) -> usize {
        match self {
            PrimitiveType::Int8 | PrimitiveType::UInt8 | PrimitiveType::Bool | PrimitiveType::Char => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 2,
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float => 4,
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Double => 8,
        }
    }

    /// Decodes one little-endian element. `bytes` must hold at least `size()` bytes.
    pub fn decode(self, bytes: &[u8]) -> Value {
        match self {
            PrimitiveType::Int8 => Value::Int(bytes[0] as i8 as i64),
            PrimitiveType::UInt8 => Value::UInt(bytes[0] as u64),
            PrimitiveType::Int16 => Value::Int(LittleEndian::read_i16(bytes) as i64),
            PrimitiveType::UInt16 => Value::UInt(LittleEndian::read_u16(bytes) as u64),
            PrimitiveType::Int32 => Value::Int(LittleEndian::read_i32(bytes) as i64),
            PrimitiveType::UInt32 => Value::UInt(LittleEndian::read_u32(bytes) as u64),
            PrimitiveType::Int64 => Value::Int(LittleEndian::read_i64(bytes)),
            PrimitiveType::UInt64 => Value::UInt(LittleEndian::read_u64(bytes)),
            PrimitiveType::Float => Value::Float(LittleEndian::read_f32(bytes)),
            PrimitiveType::Double => Value::Double(LittleEndian::read_f64(bytes)),
            PrimitiveType::Bool => Value::Bool(bytes[0] != 0),
            PrimitiveType::Char => Value::Char(bytes[0]),
        }
    }
}

/// Splits `"float[3]"` into `("float", Some(3))`.
pub fn split_array_type(type_str: &str) -> Result<(&str, Option<usize>)> {
    match type_str.split_once('[') {
        None => Ok((type_str, None)),
        Some((base, rest)) => {
            let len = rest
                .strip_suffix(']')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::InvalidFormat(format!("bad array type '{type_str}'")))?;
            Ok((base, Some(len)))
        }
    }
}

/// One field of a format definition, before flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatField {
    pub type_name: String,
    pub array_len: Option<usize>,
    pub name: String,
}

/// A message format (`F` record): `name:type0 field0;type1 field1;...`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFormat {
    pub name: String,
    pub fields: Vec<FormatField>,
}

impl MessageFormat {
    pub fn parse(definition: &str) -> Result<Self> {
        let (name, body) = definition
            .split_once(':')
            .ok_or_else(|| Error::InvalidFormat(definition.to_string()))?;

        let mut fields = Vec::new();
        for field in body.split(';').map(str::trim).filter(|f| !f.is_empty()) {
            let (type_str, field_name) = field
                .split_once(' ')
                .ok_or_else(|| Error::InvalidFormat(format!("{name}: bad field '{field}'")))?;
            let (base, array_len) = split_array_type(type_str.trim())?;
            fields.push(FormatField {
                type_name: base.to_string(),
                array_len,
                name: field_name.trim().to_string(),
            });
        }

        Ok(MessageFormat {
            name: name.trim().to_string(),
            fields,
        })
    }
}

/// A primitive column of a flattened message, at a fixed payload offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatField {
    pub name: String,
    pub primitive: PrimitiveType,
    pub offset: usize,
}

/// Flattens `message_name` into primitive columns.
///
/// Nested types become `outer.inner`, arrays `name[i]`, padding is dropped.
/// Returns the columns and the total payload size of one record.
pub fn flatten_format(
    formats: &HashMap<String, MessageFormat>,
    message_name: &str,
) -> Result<(Vec<FlatField>, usize)> {
    let format = formats.get(message_name).ok_or_else(|| {
        Error::InvalidFormat(format!("no format definition for '{message_name}'"))
    })?;
    let mut out = Vec::new();
    let size = flatten_into(formats, format, "", 0, 0, &mut out)?;
    Ok((out, size))
}

fn flatten_into(
    formats: &HashMap<String, MessageFormat>,
    format: &MessageFormat,
    prefix: &str,
    base_offset: usize,
    depth: usize,
    out: &mut Vec<FlatField>,
) -> Result<usize> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::NestingTooDeep(format.name.clone()));
    }

    let too_large = |field: &FormatField| {
        Error::InvalidFormat(format!(
            "{}: field '{}' does not fit in a record",
            format.name, field.name
        ))
    };

    let mut offset = base_offset;
    for field in &format.fields {
        let count = field.array_len.unwrap_or(1);
        if count > MAX_RECORD_SIZE {
            return Err(too_large(field));
        }

        if let Some(primitive) = PrimitiveType::from_type_name(&field.type_name) {
            if offset + count * primitive.size() > MAX_RECORD_SIZE {
                return Err(too_large(field));
            }
            if !field.name.starts_with(PADDING_PREFIX) {
                for i in 0..count {
                    let name = match field.array_len {
                        Some(_) => format!("{prefix}{}[{i}]", field.name),
                        None => format!("{prefix}{}", field.name),
                    };
                    out.push(FlatField {
                        name,
                        primitive,
                        offset: offset + i * primitive.size(),
                    });
                }
            }
            offset += count * primitive.size();
            continue;
        }

        let nested = formats.get(&field.type_name).ok_or_else(|| Error::UnknownType {
            message: format.name.clone(),
            type_name: field.type_name.clone(),
        })?;
        for i in 0..count {
            let nested_prefix = match field.array_len {
                Some(_) => format!("{prefix}{}[{i}].", field.name),
                None => format!("{prefix}{}.", field.name),
            };
            let nested_size = flatten_into(formats, nested, &nested_prefix, offset, depth + 1, out)?;
            offset += nested_size;
            if offset > MAX_RECORD_SIZE {
                return Err(too_large(field));
            }
            if nested_size == 0 {
                break;
            }
        }
    }

    Ok(offset - base_offset)
}
