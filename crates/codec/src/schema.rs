//! Row schema: ordered, immutable field layout
//!
//! A `Schema` is built once per logical record type from a list of
//! `FieldSpec`s and shared read-only across all encode/decode calls.
//! Construction computes each field's byte offset in the fixed region,
//! in field-id order, starting after the 1-byte header.
//!
//! Field ids must be dense: exactly 0..N-1, no duplicates, no gaps.
//! Violating this is a configuration error, caught at construction.

use knarr_core::{Error, FieldType, FieldValue, Result};
use rustc_hash::FxHashMap;

/// Maximum number of fields per schema.
///
/// The row header stores the field count in a single byte.
pub const MAX_FIELDS: usize = 255;

/// Declared specification of one field, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Unique field name
    pub name: String,
    /// Wire type
    pub field_type: FieldType,
    /// Dense field id (0..N-1)
    pub id: usize,
    /// Optional default override; the type's implicit default applies when absent
    pub default: Option<FieldValue>,
}

impl FieldSpec {
    /// Create a field spec with the type's implicit default.
    pub fn new(name: impl Into<String>, field_type: FieldType, id: usize) -> Self {
        FieldSpec {
            name: name.into(),
            field_type,
            id,
            default: None,
        }
    }

    /// Override the field's default value.
    ///
    /// The value's type must match `field_type`; checked at schema
    /// construction.
    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Resolved field metadata: spec plus the computed fixed-region offset.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    /// Unique field name
    pub name: String,
    /// Wire type
    pub field_type: FieldType,
    /// Dense field id
    pub id: usize,
    /// Byte offset of this field's slot in the fixed region
    pub offset: usize,
    /// Resolved default value (override or implicit)
    pub default: FieldValue,
}

/// Ordered, immutable description of a record's fields.
///
/// Owns the resolved `FieldMeta` list in id order plus a name lookup map.
/// Constructed once, then shared (typically behind an `Arc`) by every
/// `RowCodec` encoding or decoding rows of this record type.
#[derive(Debug)]
pub struct Schema {
    metas: Vec<FieldMeta>,
    by_name: FxHashMap<String, usize>,
    fixed_len: usize,
}

impl Schema {
    /// Build a schema from field specs.
    ///
    /// Fails with `Error::Schema` if an id is duplicated, an id falls
    /// outside the dense 0..N-1 range, a name is duplicated, or there are
    /// more than [`MAX_FIELDS`] fields. Fails with `Error::TypeMismatch`
    /// if a declared default's type differs from the field's type.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.len() > MAX_FIELDS {
            return Err(Error::Schema(format!(
                "schema has {} fields, maximum is {}",
                fields.len(),
                MAX_FIELDS
            )));
        }

        let count = fields.len();
        let mut slots: Vec<Option<FieldSpec>> = vec![None; count];
        for spec in fields {
            if spec.id >= count {
                return Err(Error::Schema(format!(
                    "field '{}' has id {} outside dense range 0..{}",
                    spec.name, spec.id, count
                )));
            }
            if let Some(existing) = &slots[spec.id] {
                return Err(Error::Schema(format!(
                    "duplicate field id {} ('{}' and '{}')",
                    spec.id, existing.name, spec.name
                )));
            }
            if let Some(default) = &spec.default {
                if default.field_type() != spec.field_type {
                    return Err(Error::TypeMismatch {
                        field: spec.name.clone(),
                        expected: spec.field_type.name(),
                        actual: default.field_type().name(),
                    });
                }
            }
            let id = spec.id;
            slots[id] = Some(spec);
        }

        // Dense ids plus no duplicates imply every slot is filled; keep the
        // check anyway so a future refactor cannot silently break it.
        let mut metas = Vec::with_capacity(count);
        let mut by_name = FxHashMap::default();
        let mut offset = 1; // byte 0 is the field-count header
        for (id, slot) in slots.into_iter().enumerate() {
            let spec = slot.ok_or_else(|| Error::Schema(format!("missing field id {id}")))?;
            if by_name.insert(spec.name.clone(), id).is_some() {
                return Err(Error::Schema(format!("duplicate field name '{}'", spec.name)));
            }
            let default = spec
                .default
                .unwrap_or_else(|| spec.field_type.implicit_default());
            metas.push(FieldMeta {
                name: spec.name,
                field_type: spec.field_type,
                id,
                offset,
                default,
            });
            offset += spec.field_type.slot_size();
        }

        Ok(Schema {
            metas,
            by_name,
            fixed_len: offset,
        })
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldMeta> {
        self.by_name.get(name).map(|&id| &self.metas[id])
    }

    /// Look up a field by name, failing with `Error::UnknownField`.
    pub fn field(&self, name: &str) -> Result<&FieldMeta> {
        self.get(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// All fields in id order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.metas
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.metas.len()
    }

    /// Total length of header byte plus fixed region.
    ///
    /// This is also the byte offset where the variable region begins.
    pub fn fixed_len(&self) -> usize {
        self.fixed_len
    }
}
