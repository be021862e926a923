//! Attribute values and their type tags.

use std::fmt;

use serde::Serialize;

use crate::common::{DagError, Result};

/// Declared type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `bool`.
    Boolean,
    /// `i32`.
    Int32,
    /// `u32`.
    Uint32,
    /// `i64`.
    Int64,
    /// `u64`.
    Uint64,
    /// `f32`.
    Float,
    /// A single character.
    Char,
    /// Owned text.
    String,
    /// Opaque structured bytes.
    Struct,
    /// No value.
    Null,
}

/// A value read from or written to an attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value.
    Boolean(bool),
    /// Signed 32-bit value.
    Int32(i32),
    /// Unsigned 32-bit value.
    Uint32(u32),
    /// Signed 64-bit value.
    Int64(i64),
    /// Unsigned 64-bit value.
    Uint64(u64),
    /// Single-precision value.
    Float(f32),
    /// Character value.
    Char(char),
    /// Text value.
    String(String),
    /// Opaque bytes.
    Struct(Vec<u8>),
    /// No value.
    Null,
}

impl AttributeValue {
    /// Returns the type tag of this value.
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Int32(_) => ValueType::Int32,
            Self::Uint32(_) => ValueType::Uint32,
            Self::Int64(_) => ValueType::Int64,
            Self::Uint64(_) => ValueType::Uint64,
            Self::Float(_) => ValueType::Float,
            Self::Char(_) => ValueType::Char,
            Self::String(_) => ValueType::String,
            Self::Struct(_) => ValueType::Struct,
            Self::Null => ValueType::Null,
        }
    }

    /// Returns the boolean payload, if any.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the `u32` payload, if any.
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `i32` payload, if any.
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `u64` payload, if any.
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", if *b { "on" } else { "off" }),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) => f.write_str(s),
            Self::Struct(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Null => f.write_str("null"),
        }
    }
}

fn parse_unsigned(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

impl ValueType {
    /// Parses `text` as a value of this type.
    ///
    /// Booleans accept `on`/`off`, `true`/`false` and `1`/`0`; unsigned
    /// integers accept a `0x` prefix. Struct and null values have no text form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the text does not parse.
    pub fn parse(self, text: &str) -> Result<AttributeValue> {
        let text = text.trim();
        let bad = || DagError::InvalidParameter(format!("cannot parse {text:?} as {self:?}"));
        let value = match self {
            Self::Boolean => match text.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => AttributeValue::Boolean(true),
                "off" | "false" | "0" => AttributeValue::Boolean(false),
                _ => return Err(bad()),
            },
            Self::Int32 => AttributeValue::Int32(text.parse().map_err(|_| bad())?),
            Self::Int64 => AttributeValue::Int64(text.parse().map_err(|_| bad())?),
            Self::Uint32 => {
                let v = parse_unsigned(text).ok_or_else(bad)?;
                AttributeValue::Uint32(u32::try_from(v).map_err(|_| bad())?)
            }
            Self::Uint64 => AttributeValue::Uint64(parse_unsigned(text).ok_or_else(bad)?),
            Self::Float => AttributeValue::Float(text.parse().map_err(|_| bad())?),
            Self::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => AttributeValue::Char(c),
                    _ => return Err(bad()),
                }
            }
            Self::String => AttributeValue::String(text.to_owned()),
            Self::Struct | Self::Null => return Err(bad()),
        };
        Ok(value)
    }
}
