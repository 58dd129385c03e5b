// src/data_input/ulog/value.rs

use std::fmt;

/// A single decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(u8),
}

impl Value {
    /// Numeric view used for plotting. Booleans map to 0/1.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(v) => v as f64,
            Value::UInt(v) => v as f64,
            Value::Float(v) => v as f64,
            Value::Double(v) => v,
            Value::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Char(v) => v as f64,
        }
    }
}

// Shortest round-trip form, keeping a trailing ".0" on integral values.
fn format_float<T>(f: &mut fmt::Formatter<'_>, v: T, is_nan: bool, is_inf: bool, negative: bool) -> fmt::Result
where
    T: fmt::Debug,
{
    if is_nan {
        f.write_str("nan")
    } else if is_inf {
        f.write_str(if negative { "-inf" } else { "inf" })
    } else {
        write!(f, "{v:?}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => format_float(f, v, v.is_nan(), v.is_infinite(), v < 0.0),
            Value::Double(v) => format_float(f, v, v.is_nan(), v.is_infinite(), v < 0.0),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_decimal_point() {
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.1).to_string(), "0.1");
        assert_eq!(Value::Double(-47.397742).to_string(), "-47.397742");
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(Value::Float(f32::NAN).to_string(), "nan");
        assert_eq!(Value::Double(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn integers_and_bools() {
        assert_eq!(Value::Int(-473977420).to_string(), "-473977420");
        assert_eq!(Value::UInt(1_000_000).to_string(), "1000000");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Char(65).to_string(), "65");
    }

    #[test]
    fn numeric_view() {
        assert_eq!(Value::Bool(true).as_f64(), 1.0);
        assert_eq!(Value::Int(-3).as_f64(), -3.0);
        assert_eq!(Value::Float(1.5).as_f64(), 1.5);
    }
}
