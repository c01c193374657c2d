//! Candidate: the domain record stored per label
//!
//! A candidate is a dense vector, an optional sparse term/weight pair
//! (parallel arrays), an opaque payload string, and an expiration
//! timestamp. Candidates live in the candidates table, keyed by label;
//! the encoded form is one row blob under the fixed candidate schema.

use crate::convert;
use knarr_codec::{FieldSpec, Row, RowCodec, Schema};
use knarr_core::{Error, FieldType, FieldValue, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn type_error(field: &str, expected: &'static str, value: &FieldValue) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: value.field_type().name(),
    }
}

/// A stored record: label + vector + sparse terms + opaque payload +
/// optional expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Primary key
    pub label: i64,
    /// Dense embedding vector
    pub vector: Vec<f32>,
    /// Sparse term strings, parallel to `sparse_values`
    pub sparse_raw_terms: Vec<String>,
    /// Sparse term weights, parallel to `sparse_raw_terms`
    pub sparse_values: Vec<f32>,
    /// Opaque payload, typically a serialized document
    pub fields: String,
    /// Expiry in epoch nanoseconds; 0 = no expiry
    pub expire_ns_ts: i64,
    /// Reserved for soft-delete use
    pub is_deleted: bool,
}

impl Candidate {
    /// Create a candidate with the given label and empty payload.
    pub fn new(label: i64) -> Self {
        Candidate {
            label,
            ..Candidate::default()
        }
    }

    /// The fixed candidate row schema.
    ///
    /// Field ids are frozen; changing them breaks every stored row.
    pub fn schema() -> Result<Schema> {
        Schema::new(vec![
            FieldSpec::new("label", FieldType::Int64, 0).with_default(0i64),
            FieldSpec::new("vector", FieldType::ListFloat32, 1).with_default(Vec::<f32>::new()),
            FieldSpec::new("sparse_raw_terms", FieldType::ListString, 2)
                .with_default(Vec::<String>::new()),
            FieldSpec::new("sparse_values", FieldType::ListFloat32, 3)
                .with_default(Vec::<f32>::new()),
            FieldSpec::new("fields", FieldType::String, 4).with_default(""),
            FieldSpec::new("expire_ns_ts", FieldType::Int64, 5).with_default(0i64),
            FieldSpec::new("is_deleted", FieldType::Boolean, 6).with_default(false),
        ])
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.set("label", self.label)
            .set("vector", self.vector.clone())
            .set("sparse_raw_terms", self.sparse_raw_terms.clone())
            .set("sparse_values", self.sparse_values.clone())
            .set("fields", self.fields.clone())
            .set("expire_ns_ts", self.expire_ns_ts)
            .set("is_deleted", self.is_deleted);
        row
    }

    fn from_row(row: &Row) -> Result<Candidate> {
        Ok(Candidate {
            label: convert::req_i64(row, "label")?,
            vector: convert::req_list_f32(row, "vector")?,
            sparse_raw_terms: convert::req_list_string(row, "sparse_raw_terms")?,
            sparse_values: convert::req_list_f32(row, "sparse_values")?,
            fields: convert::req_string(row, "fields")?,
            expire_ns_ts: convert::req_i64(row, "expire_ns_ts")?,
            is_deleted: convert::req_bool(row, "is_deleted")?,
        })
    }
}

/// Row codec bound to the candidate schema.
///
/// Exposes single-field decodes for the hot paths that only need the
/// payload or the expiry out of a stored row, avoiding a full decode.
#[derive(Debug, Clone)]
pub struct CandidateCodec {
    codec: RowCodec,
}

impl CandidateCodec {
    /// Build the codec; fails only if the frozen schema is invalid.
    pub fn new() -> Result<Self> {
        Ok(CandidateCodec {
            codec: RowCodec::new(Arc::new(Candidate::schema()?)),
        })
    }

    /// Encode one candidate to its row blob.
    pub fn encode(&self, candidate: &Candidate) -> Result<Vec<u8>> {
        self.codec.serialize(&candidate.to_row())
    }

    /// Encode a batch of candidates.
    pub fn encode_batch(&self, candidates: &[Candidate]) -> Result<Vec<Vec<u8>>> {
        let rows: Vec<Row> = candidates.iter().map(Candidate::to_row).collect();
        self.codec.serialize_batch(&rows)
    }

    /// Decode a full candidate from a row blob.
    pub fn decode(&self, data: &[u8]) -> Result<Candidate> {
        Candidate::from_row(&self.codec.deserialize(data)?)
    }

    /// Decode only the opaque `fields` payload.
    pub fn decode_fields(&self, data: &[u8]) -> Result<String> {
        match self.codec.deserialize_field(data, "fields")? {
            FieldValue::String(s) => Ok(s),
            other => Err(type_error("fields", "string", &other)),
        }
    }

    /// Decode only the expiry timestamp.
    pub fn decode_expire_ns_ts(&self, data: &[u8]) -> Result<i64> {
        match self.codec.deserialize_field(data, "expire_ns_ts")? {
            FieldValue::Int64(v) => Ok(v),
            other => Err(type_error("expire_ns_ts", "int64", &other)),
        }
    }

    /// Decode only the label.
    pub fn decode_label(&self, data: &[u8]) -> Result<i64> {
        match self.codec.deserialize_field(data, "label")? {
            FieldValue::Int64(v) => Ok(v),
            other => Err(type_error("label", "int64", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Candidate {
        Candidate {
            label: 42,
            vector: vec![0.1, 0.2, 0.3, 0.4],
            sparse_raw_terms: vec!["foo".into(), "bar".into()],
            sparse_values: vec![0.3, 0.7],
            fields: "{\"k\":1}".to_string(),
            expire_ns_ts: 1234567890,
            is_deleted: false,
        }
    }

    #[test]
    fn test_candidate_round_trip() {
        let codec = CandidateCodec::new().unwrap();
        let cand = sample();
        let data = codec.encode(&cand).unwrap();
        assert_eq!(codec.decode(&data).unwrap(), cand);
    }

    #[test]
    fn test_single_field_decodes() {
        let codec = CandidateCodec::new().unwrap();
        let data = codec.encode(&sample()).unwrap();
        assert_eq!(codec.decode_fields(&data).unwrap(), "{\"k\":1}");
        assert_eq!(codec.decode_expire_ns_ts(&data).unwrap(), 1234567890);
        assert_eq!(codec.decode_label(&data).unwrap(), 42);
    }

    #[test]
    fn test_payload_stays_valid_json() {
        let codec = CandidateCodec::new().unwrap();
        let data = codec.encode(&sample()).unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&codec.decode_fields(&data).unwrap()).unwrap();
        assert_eq!(payload["k"], 1);
    }

    #[test]
    fn test_default_candidate_encodes() {
        let codec = CandidateCodec::new().unwrap();
        let cand = Candidate::new(7);
        let data = codec.encode(&cand).unwrap();
        let back = codec.decode(&data).unwrap();
        assert_eq!(back.label, 7);
        assert_eq!(back.fields, "");
        assert_eq!(back.expire_ns_ts, 0);
        assert!(back.vector.is_empty());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let codec = CandidateCodec::new().unwrap();
        let cand = sample();
        assert_eq!(codec.encode(&cand).unwrap(), codec.encode(&cand).unwrap());
    }

    #[test]
    fn test_schema_field_ids_frozen() {
        let schema = Candidate::schema().unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "label",
                "vector",
                "sparse_raw_terms",
                "sparse_values",
                "fields",
                "expire_ns_ts",
                "is_deleted"
            ]
        );
    }
}
