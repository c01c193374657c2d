//! Field types and values for schema-driven rows
//!
//! This module defines:
//! - `FieldType`: the nine supported wire types
//! - `FieldValue`: a tagged union holding one value per supported type
//!
//! `FieldValue` is the typed replacement for a loosely-typed record dict:
//! a value is validated against the schema's declared `FieldType` once, at
//! the serialize boundary, instead of deep inside the codec.
//!
//! ## Type Rules
//!
//! - Different variants are never interchangeable: `Int64(1)` is not
//!   `UInt64(1)`, `String` is not `Binary`.
//! - Float32 equality follows IEEE-754 (`NaN != NaN`), via the derived
//!   `PartialEq` on `f32`.

use serde::{Deserialize, Serialize};

/// The nine field types supported by the row wire format.
///
/// Fixed-width types occupy their value's width in the fixed region;
/// variable-width types (string, binary, lists) occupy a 4-byte pointer
/// slot there and append their payload to the variable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// 64-bit signed integer, 8-byte little-endian slot
    Int64,
    /// 64-bit unsigned integer, 8-byte little-endian slot
    UInt64,
    /// 32-bit IEEE-754 float, 4-byte little-endian slot
    Float32,
    /// UTF-8 string, u16-length-prefixed payload
    String,
    /// Raw bytes, u32-length-prefixed payload
    Binary,
    /// Boolean, 1-byte slot (0 or 1)
    Boolean,
    /// List of int64, u16 count + 8 bytes per element
    ListInt64,
    /// List of UTF-8 strings, u16 count + u16-length-prefixed elements
    ListString,
    /// List of float32, u16 count + 4 bytes per element
    ListFloat32,
}

impl FieldType {
    /// Width of this type's slot in the fixed region.
    ///
    /// Variable-width types report the width of their pointer slot.
    pub fn slot_size(self) -> usize {
        match self {
            FieldType::Int64 | FieldType::UInt64 => 8,
            FieldType::Float32 => 4,
            FieldType::Boolean => 1,
            FieldType::String
            | FieldType::Binary
            | FieldType::ListInt64
            | FieldType::ListString
            | FieldType::ListFloat32 => 4,
        }
    }

    /// The default value a field of this type carries when its spec
    /// declares none.
    ///
    /// These values are part of the wire contract: a reader decoding a
    /// field beyond a short row's header count resolves to exactly these.
    pub fn implicit_default(self) -> FieldValue {
        match self {
            FieldType::Int64 => FieldValue::Int64(0),
            FieldType::UInt64 => FieldValue::UInt64(0),
            FieldType::Float32 => FieldValue::Float32(0.0),
            FieldType::String => FieldValue::String("default".to_string()),
            FieldType::Binary => FieldValue::Binary(Vec::new()),
            FieldType::Boolean => FieldValue::Bool(false),
            FieldType::ListInt64 => FieldValue::ListInt64(vec![0]),
            FieldType::ListString => FieldValue::ListString(vec!["default".to_string()]),
            FieldType::ListFloat32 => FieldValue::ListFloat32(vec![0.0]),
        }
    }

    /// Human-readable type name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Int64 => "int64",
            FieldType::UInt64 => "uint64",
            FieldType::Float32 => "float32",
            FieldType::String => "string",
            FieldType::Binary => "binary",
            FieldType::Boolean => "boolean",
            FieldType::ListInt64 => "list<int64>",
            FieldType::ListString => "list<string>",
            FieldType::ListFloat32 => "list<float32>",
        }
    }
}

/// A single typed field value.
///
/// One variant per `FieldType`. A `FieldValue` knows its own type, so the
/// codec can reject a value that does not match the schema's declared type
/// with a precise error instead of packing garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit unsigned integer
    UInt64(u64),
    /// 32-bit float
    Float32(f32),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Boolean
    Bool(bool),
    /// List of int64
    ListInt64(Vec<i64>),
    /// List of strings
    ListString(Vec<String>),
    /// List of float32
    ListFloat32(Vec<f32>),
}

impl FieldValue {
    /// The wire type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int64(_) => FieldType::Int64,
            FieldValue::UInt64(_) => FieldType::UInt64,
            FieldValue::Float32(_) => FieldType::Float32,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Binary(_) => FieldType::Binary,
            FieldValue::Bool(_) => FieldType::Boolean,
            FieldValue::ListInt64(_) => FieldType::ListInt64,
            FieldValue::ListString(_) => FieldType::ListString,
            FieldValue::ListFloat32(_) => FieldType::ListFloat32,
        }
    }

    /// Get as i64 if this is an Int64 value
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            FieldValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as u64 if this is a UInt64 value
    pub fn as_uint64(&self) -> Option<u64> {
        match self {
            FieldValue::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as f32 if this is a Float32 value
    pub fn as_float32(&self) -> Option<f32> {
        match self {
            FieldValue::Float32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as byte slice if this is a Binary value
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as &[i64] if this is a ListInt64 value
    pub fn as_list_int64(&self) -> Option<&[i64]> {
        match self {
            FieldValue::ListInt64(v) => Some(v),
            _ => None,
        }
    }

    /// Get as &[String] if this is a ListString value
    pub fn as_list_string(&self) -> Option<&[String]> {
        match self {
            FieldValue::ListString(v) => Some(v),
            _ => None,
        }
    }

    /// Get as &[f32] if this is a ListFloat32 value
    pub fn as_list_float32(&self) -> Option<&[f32]> {
        match self {
            FieldValue::ListFloat32(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int64(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt64(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float32(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Binary(v)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(v: Vec<i64>) -> Self {
        FieldValue::ListInt64(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::ListString(v)
    }
}

impl From<Vec<f32>> for FieldValue {
    fn from(v: Vec<f32>) -> Self {
        FieldValue::ListFloat32(v)
    }
}
