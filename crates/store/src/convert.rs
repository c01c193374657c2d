//! Typed extraction of decoded row fields.
//!
//! A decoded `Row` always carries every schema field, so a missing or
//! mistyped field here means the blob was written by an incompatible
//! schema; both are reported as errors rather than papered over.

use knarr_codec::Row;
use knarr_core::{Error, FieldValue, Result};

fn missing(name: &str) -> Error {
    Error::Corruption(format!("decoded row missing field '{name}'"))
}

fn mismatch(name: &str, expected: &'static str, value: &FieldValue) -> Error {
    Error::TypeMismatch {
        field: name.to_string(),
        expected,
        actual: value.field_type().name(),
    }
}

pub(crate) fn req_i64(row: &Row, name: &str) -> Result<i64> {
    match row.get(name) {
        Some(FieldValue::Int64(v)) => Ok(*v),
        Some(other) => Err(mismatch(name, "int64", other)),
        None => Err(missing(name)),
    }
}

pub(crate) fn req_u64(row: &Row, name: &str) -> Result<u64> {
    match row.get(name) {
        Some(FieldValue::UInt64(v)) => Ok(*v),
        Some(other) => Err(mismatch(name, "uint64", other)),
        None => Err(missing(name)),
    }
}

pub(crate) fn req_bool(row: &Row, name: &str) -> Result<bool> {
    match row.get(name) {
        Some(FieldValue::Bool(v)) => Ok(*v),
        Some(other) => Err(mismatch(name, "boolean", other)),
        None => Err(missing(name)),
    }
}

pub(crate) fn req_string(row: &Row, name: &str) -> Result<String> {
    match row.get(name) {
        Some(FieldValue::String(v)) => Ok(v.clone()),
        Some(other) => Err(mismatch(name, "string", other)),
        None => Err(missing(name)),
    }
}

pub(crate) fn req_list_f32(row: &Row, name: &str) -> Result<Vec<f32>> {
    match row.get(name) {
        Some(FieldValue::ListFloat32(v)) => Ok(v.clone()),
        Some(other) => Err(mismatch(name, "list<float32>", other)),
        None => Err(missing(name)),
    }
}

pub(crate) fn req_list_string(row: &Row, name: &str) -> Result<Vec<String>> {
    match row.get(name) {
        Some(FieldValue::ListString(v)) => Ok(v.clone()),
        Some(other) => Err(mismatch(name, "list<string>", other)),
        None => Err(missing(name)),
    }
}
