//! Binary row codec: fixed+variable layout encoder/decoder
//!
//! Encodes a field-name → value record into a single byte blob per a
//! `Schema`, and decodes either the whole blob or one named field back out.
//! The layout must be reproduced byte-for-byte by any independent
//! implementation; it is the one wire contract of this subsystem.
//!
//! # Format
//!
//! ```text
//! Row Layout:
//! ┌──────────────────┬─────────────────────────┬───────────────────────┐
//! │ Count (1 byte)   │ Fixed region            │ Variable region       │
//! └──────────────────┴─────────────────────────┴───────────────────────┘
//!
//! Fixed region: one slot per field in id order.
//!   int64 / uint64   8 bytes LE
//!   float32          4 bytes LE
//!   boolean          1 byte (0 or 1)
//!   string / binary / list<_>
//!                    4-byte LE offset into the variable region
//!                    (absolute, from the start of the row)
//!
//! Variable region payloads:
//!   string           u16 LE length + UTF-8 bytes
//!   binary           u32 LE length + raw bytes
//!   list<int64>      u16 LE count  + count * 8-byte LE elements
//!   list<float32>    u16 LE count  + count * 4-byte LE elements
//!   list<string>     u16 LE count  + per element: u16 LE length + bytes
//! ```
//!
//! Note the asymmetry: a top-level string uses a u16 length prefix while a
//! top-level binary uses u32, and strings inside a list use u16. This is
//! part of the frozen contract, not a simplification to clean up.
//!
//! The header byte records how many fields the writer's schema had, so a
//! narrower historical row stays decodable under a wider current schema:
//! reading a field id at or beyond the stored count yields the field's
//! default rather than an error.

use crate::schema::Schema;
use byteorder::{ByteOrder, LittleEndian};
use knarr_core::{Error, FieldType, FieldValue, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A record: field name → typed value.
///
/// The in-memory form of one encoded row. Fields the record does not
/// supply are encoded with the schema's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: HashMap<String, FieldValue>,
}

impl Row {
    /// Create an empty record.
    pub fn new() -> Self {
        Row::default()
    }

    /// Set a field value, replacing any existing one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Whether the record supplies a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of supplied fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record supplies no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over supplied (name, value) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }
}

impl FromIterator<(String, FieldValue)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Row {
            values: iter.into_iter().collect(),
        }
    }
}

/// Schema-driven row encoder/decoder.
///
/// Holds a shared, immutable `Schema`; all methods take `&self` and are
/// safe to call concurrently.
#[derive(Debug, Clone)]
pub struct RowCodec {
    schema: Arc<Schema>,
}

impl RowCodec {
    /// Create a codec over a shared schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        RowCodec { schema }
    }

    /// The schema this codec encodes against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Encode a record into one row blob.
    ///
    /// For every schema field in id order: the supplied value, or the
    /// field's default when absent. A value whose type differs from the
    /// declared field type is rejected. Encoding the same record twice
    /// produces byte-identical output.
    pub fn serialize(&self, row: &Row) -> Result<Vec<u8>> {
        let mut fixed = vec![0u8; self.schema.fixed_len()];
        fixed[0] = self.schema.field_count() as u8;
        let mut var: Vec<u8> = Vec::new();

        for meta in self.schema.fields() {
            let value = row.get(&meta.name).unwrap_or(&meta.default);
            if value.field_type() != meta.field_type {
                return Err(Error::TypeMismatch {
                    field: meta.name.clone(),
                    expected: meta.field_type.name(),
                    actual: value.field_type().name(),
                });
            }
            let slot = &mut fixed[meta.offset..];
            match value {
                FieldValue::Int64(v) => LittleEndian::write_i64(slot, *v),
                FieldValue::UInt64(v) => LittleEndian::write_u64(slot, *v),
                FieldValue::Float32(v) => LittleEndian::write_f32(slot, *v),
                FieldValue::Bool(v) => slot[0] = *v as u8,
                FieldValue::String(s) => {
                    self.write_pointer(slot, var.len(), &meta.name)?;
                    push_str(&mut var, s, &meta.name)?;
                }
                FieldValue::Binary(b) => {
                    self.write_pointer(slot, var.len(), &meta.name)?;
                    let len = u32::try_from(b.len()).map_err(|_| {
                        Error::Serialization(format!(
                            "binary field '{}' is {} bytes, exceeds u32 length",
                            meta.name,
                            b.len()
                        ))
                    })?;
                    push_u32(&mut var, len);
                    var.extend_from_slice(b);
                }
                FieldValue::ListInt64(items) => {
                    self.write_pointer(slot, var.len(), &meta.name)?;
                    push_count(&mut var, items.len(), &meta.name)?;
                    for item in items {
                        let mut elem = [0u8; 8];
                        LittleEndian::write_i64(&mut elem, *item);
                        var.extend_from_slice(&elem);
                    }
                }
                FieldValue::ListFloat32(items) => {
                    self.write_pointer(slot, var.len(), &meta.name)?;
                    push_count(&mut var, items.len(), &meta.name)?;
                    for item in items {
                        let mut elem = [0u8; 4];
                        LittleEndian::write_f32(&mut elem, *item);
                        var.extend_from_slice(&elem);
                    }
                }
                FieldValue::ListString(items) => {
                    self.write_pointer(slot, var.len(), &meta.name)?;
                    push_count(&mut var, items.len(), &meta.name)?;
                    for item in items {
                        push_str(&mut var, item, &meta.name)?;
                    }
                }
            }
        }

        fixed.extend_from_slice(&var);
        Ok(fixed)
    }

    /// Encode a batch of records.
    pub fn serialize_batch(&self, rows: &[Row]) -> Result<Vec<Vec<u8>>> {
        rows.iter().map(|row| self.serialize(row)).collect()
    }

    /// Decode one named field out of a row blob.
    ///
    /// If the row's header count is at or below the field's id, the row
    /// was written by a narrower schema and the field's default is
    /// returned; this is the compatibility path, never an error. A pointer
    /// or length that falls outside the buffer is a corruption error.
    pub fn deserialize_field(&self, data: &[u8], name: &str) -> Result<FieldValue> {
        let meta = self.schema.field(name)?;
        let present = *data
            .first()
            .ok_or_else(|| Error::Corruption("empty row buffer".to_string()))?
            as usize;
        if meta.id >= present {
            return Ok(meta.default.clone());
        }

        match meta.field_type {
            FieldType::Int64 => {
                Ok(FieldValue::Int64(LittleEndian::read_i64(slice(
                    data,
                    meta.offset,
                    8,
                )?)))
            }
            FieldType::UInt64 => {
                Ok(FieldValue::UInt64(LittleEndian::read_u64(slice(
                    data,
                    meta.offset,
                    8,
                )?)))
            }
            FieldType::Float32 => {
                Ok(FieldValue::Float32(LittleEndian::read_f32(slice(
                    data,
                    meta.offset,
                    4,
                )?)))
            }
            FieldType::Boolean => {
                Ok(FieldValue::Bool(slice(data, meta.offset, 1)?[0] != 0))
            }
            FieldType::String => {
                let at = read_u32(data, meta.offset)? as usize;
                let len = read_u16(data, at)? as usize;
                let bytes = slice(data, at + 2, len)?;
                Ok(FieldValue::String(decode_utf8(bytes)?))
            }
            FieldType::Binary => {
                let at = read_u32(data, meta.offset)? as usize;
                let len = read_u32(data, at)? as usize;
                Ok(FieldValue::Binary(slice(data, at + 4, len)?.to_vec()))
            }
            FieldType::ListInt64 => {
                let at = read_u32(data, meta.offset)? as usize;
                let count = read_u16(data, at)? as usize;
                let body = slice(data, at + 2, count * 8)?;
                let mut items = Vec::with_capacity(count);
                for chunk in body.chunks_exact(8) {
                    items.push(LittleEndian::read_i64(chunk));
                }
                Ok(FieldValue::ListInt64(items))
            }
            FieldType::ListFloat32 => {
                let at = read_u32(data, meta.offset)? as usize;
                let count = read_u16(data, at)? as usize;
                let body = slice(data, at + 2, count * 4)?;
                let mut items = Vec::with_capacity(count);
                for chunk in body.chunks_exact(4) {
                    items.push(LittleEndian::read_f32(chunk));
                }
                Ok(FieldValue::ListFloat32(items))
            }
            FieldType::ListString => {
                let mut at = read_u32(data, meta.offset)? as usize;
                let count = read_u16(data, at)? as usize;
                at += 2;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let len = read_u16(data, at)? as usize;
                    at += 2;
                    items.push(decode_utf8(slice(data, at, len)?)?);
                    at += len;
                }
                Ok(FieldValue::ListString(items))
            }
        }
    }

    /// Decode a whole row blob into a record.
    ///
    /// Every schema field appears in the result; fields the row does not
    /// carry resolve to their defaults.
    pub fn deserialize(&self, data: &[u8]) -> Result<Row> {
        let mut row = Row::new();
        for meta in self.schema.fields() {
            let value = self.deserialize_field(data, &meta.name)?;
            row.set(meta.name.clone(), value);
        }
        Ok(row)
    }

    /// Write a variable-region pointer into a fixed slot.
    ///
    /// The pointer is absolute: fixed-region length plus the payload's
    /// position in the variable region.
    fn write_pointer(&self, slot: &mut [u8], var_pos: usize, field: &str) -> Result<()> {
        let pointer = self.schema.fixed_len() + var_pos;
        let pointer = u32::try_from(pointer).map_err(|_| {
            Error::Serialization(format!(
                "variable region offset {pointer} for field '{field}' exceeds u32"
            ))
        })?;
        LittleEndian::write_u32(slot, pointer);
        Ok(())
    }
}

/// Bounds-checked subslice; out-of-range reads are corruption.
fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            Error::Corruption(format!(
                "read of {len} bytes at offset {offset} past buffer end {}",
                data.len()
            ))
        })
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    Ok(LittleEndian::read_u16(slice(data, offset, 2)?))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(slice(data, offset, 4)?))
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Corruption(format!("invalid UTF-8 in string payload: {e}")))
}

/// Append a u16-length-prefixed UTF-8 string to the variable region.
fn push_str(var: &mut Vec<u8>, s: &str, field: &str) -> Result<()> {
    let len = u16::try_from(s.len()).map_err(|_| {
        Error::Serialization(format!(
            "string in field '{field}' is {} bytes, exceeds u16 length",
            s.len()
        ))
    })?;
    push_u16(var, len);
    var.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Append a u16 list element count.
fn push_count(var: &mut Vec<u8>, count: usize, field: &str) -> Result<()> {
    let count = u16::try_from(count).map_err(|_| {
        Error::Serialization(format!(
            "list field '{field}' has {count} elements, exceeds u16 count"
        ))
    })?;
    push_u16(var, count);
    Ok(())
}

fn push_u16(var: &mut Vec<u8>, v: u16) {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, v);
    var.extend_from_slice(&buf);
}

fn push_u32(var: &mut Vec<u8>, v: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, v);
    var.extend_from_slice(&buf);
}
