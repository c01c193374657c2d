//! DeltaRecord: append-only change events for CDC/audit
//!
//! Every mutation of the candidates table produces one delta per affected
//! label: an UPSERT carrying the new candidate fields plus the previous
//! payload as a pre-image, or a DELETE carrying the pre-image only. The
//! delta table is keyed by a write-time nanosecond timestamp; a CDC
//! consumer reads everything after its checkpoint, then trims everything
//! up to it once durably consumed. Deltas are purely derivative — dropping
//! the table forfeits replay history but never corrupts current state.

use crate::candidate::Candidate;
use crate::convert;
use knarr_codec::{FieldSpec, Row, RowCodec, Schema};
use knarr_core::{Error, FieldType, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The change a delta describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaKind {
    /// Insert or update of a candidate
    Upsert,
    /// Removal of a candidate (explicit delete or TTL expiry)
    Delete,
}

impl DeltaKind {
    /// Wire encoding of the kind.
    pub fn as_u64(self) -> u64 {
        match self {
            DeltaKind::Upsert => 0,
            DeltaKind::Delete => 1,
        }
    }

    /// Decode the wire value.
    pub fn from_u64(value: u64) -> Result<Self> {
        match value {
            0 => Ok(DeltaKind::Upsert),
            1 => Ok(DeltaKind::Delete),
            other => Err(Error::Corruption(format!("unknown delta kind {other}"))),
        }
    }
}

/// One change event in the delta log.
///
/// For an upsert, the new candidate fields are populated and `old_fields`
/// carries the previous payload (empty for a brand-new label). For a
/// delete, only `label` and `old_fields` are meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Upsert or delete
    pub kind: DeltaKind,
    /// Affected label
    pub label: i64,
    /// New dense vector (upsert only)
    pub vector: Vec<f32>,
    /// New sparse terms (upsert only)
    pub sparse_raw_terms: Vec<String>,
    /// New sparse weights (upsert only)
    pub sparse_values: Vec<f32>,
    /// New opaque payload (upsert only)
    pub fields: String,
    /// Previous payload; empty for a brand-new label
    pub old_fields: String,
}

impl DeltaRecord {
    /// Build an upsert delta from the new candidate and the prior payload.
    pub fn upsert(candidate: &Candidate, old_fields: String) -> Self {
        DeltaRecord {
            kind: DeltaKind::Upsert,
            label: candidate.label,
            vector: candidate.vector.clone(),
            sparse_raw_terms: candidate.sparse_raw_terms.clone(),
            sparse_values: candidate.sparse_values.clone(),
            fields: candidate.fields.clone(),
            old_fields,
        }
    }

    /// Build a delete delta carrying only the pre-image.
    pub fn delete(label: i64, old_fields: String) -> Self {
        DeltaRecord {
            kind: DeltaKind::Delete,
            label,
            vector: Vec::new(),
            sparse_raw_terms: Vec::new(),
            sparse_values: Vec::new(),
            fields: String::new(),
            old_fields,
        }
    }

    /// The fixed delta row schema. Field ids are frozen.
    pub fn schema() -> Result<Schema> {
        Schema::new(vec![
            FieldSpec::new("type", FieldType::UInt64, 0).with_default(0u64),
            FieldSpec::new("label", FieldType::Int64, 1).with_default(0i64),
            FieldSpec::new("vector", FieldType::ListFloat32, 2).with_default(Vec::<f32>::new()),
            FieldSpec::new("sparse_raw_terms", FieldType::ListString, 3)
                .with_default(Vec::<String>::new()),
            FieldSpec::new("sparse_values", FieldType::ListFloat32, 4)
                .with_default(Vec::<f32>::new()),
            FieldSpec::new("fields", FieldType::String, 5).with_default(""),
            FieldSpec::new("old_fields", FieldType::String, 6).with_default(""),
        ])
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.set("type", self.kind.as_u64())
            .set("label", self.label)
            .set("vector", self.vector.clone())
            .set("sparse_raw_terms", self.sparse_raw_terms.clone())
            .set("sparse_values", self.sparse_values.clone())
            .set("fields", self.fields.clone())
            .set("old_fields", self.old_fields.clone());
        row
    }

    fn from_row(row: &Row) -> Result<DeltaRecord> {
        Ok(DeltaRecord {
            kind: DeltaKind::from_u64(convert::req_u64(row, "type")?)?,
            label: convert::req_i64(row, "label")?,
            vector: convert::req_list_f32(row, "vector")?,
            sparse_raw_terms: convert::req_list_string(row, "sparse_raw_terms")?,
            sparse_values: convert::req_list_f32(row, "sparse_values")?,
            fields: convert::req_string(row, "fields")?,
            old_fields: convert::req_string(row, "old_fields")?,
        })
    }
}

/// Row codec bound to the delta schema.
#[derive(Debug, Clone)]
pub struct DeltaCodec {
    codec: RowCodec,
}

impl DeltaCodec {
    /// Build the codec; fails only if the frozen schema is invalid.
    pub fn new() -> Result<Self> {
        Ok(DeltaCodec {
            codec: RowCodec::new(Arc::new(DeltaRecord::schema()?)),
        })
    }

    /// Encode one delta to its row blob.
    pub fn encode(&self, delta: &DeltaRecord) -> Result<Vec<u8>> {
        self.codec.serialize(&delta.to_row())
    }

    /// Encode a batch of deltas.
    pub fn encode_batch(&self, deltas: &[DeltaRecord]) -> Result<Vec<Vec<u8>>> {
        let rows: Vec<Row> = deltas.iter().map(DeltaRecord::to_row).collect();
        self.codec.serialize_batch(&rows)
    }

    /// Decode a delta from a row blob.
    pub fn decode(&self, data: &[u8]) -> Result<DeltaRecord> {
        DeltaRecord::from_row(&self.codec.deserialize(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_round_trip() {
        let cand = Candidate {
            label: 9,
            vector: vec![1.0, 2.0],
            sparse_raw_terms: vec!["t".into()],
            sparse_values: vec![0.5],
            fields: "new-payload".into(),
            expire_ns_ts: 0,
            is_deleted: false,
        };
        let delta = DeltaRecord::upsert(&cand, "old-payload".into());

        let codec = DeltaCodec::new().unwrap();
        let data = codec.encode(&delta).unwrap();
        let back = codec.decode(&data).unwrap();
        assert_eq!(back, delta);
        assert_eq!(back.kind, DeltaKind::Upsert);
        assert_eq!(back.old_fields, "old-payload");
    }

    #[test]
    fn test_delete_round_trip() {
        let delta = DeltaRecord::delete(-3, "gone".into());
        let codec = DeltaCodec::new().unwrap();
        let back = codec.decode(&codec.encode(&delta).unwrap()).unwrap();
        assert_eq!(back.kind, DeltaKind::Delete);
        assert_eq!(back.label, -3);
        assert_eq!(back.old_fields, "gone");
        assert!(back.vector.is_empty());
        assert!(back.fields.is_empty());
    }

    #[test]
    fn test_kind_wire_values() {
        assert_eq!(DeltaKind::Upsert.as_u64(), 0);
        assert_eq!(DeltaKind::Delete.as_u64(), 1);
        assert_eq!(DeltaKind::from_u64(0).unwrap(), DeltaKind::Upsert);
        assert_eq!(DeltaKind::from_u64(1).unwrap(), DeltaKind::Delete);
        assert!(matches!(
            DeltaKind::from_u64(7).unwrap_err(),
            Error::Corruption(_)
        ));
    }
}
