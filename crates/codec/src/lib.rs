//! Schema-driven binary row codec
//!
//! The wire format of the knarr persistence core: records are encoded as
//! a 1-byte field-count header, a fixed region of per-field slots in id
//! order, and a variable region holding length-prefixed payloads that the
//! fixed slots point into. See [`row`] for the exact byte layout.
//!
//! Two independent implementations of this format must be byte-for-byte
//! interchangeable, so the layout here is frozen: little-endian integers
//! everywhere, u16 string prefixes, u32 binary prefixes, u16 in-list
//! string prefixes.

pub mod row;
pub mod schema;

pub use row::{Row, RowCodec};
pub use schema::{FieldMeta, FieldSpec, Schema, MAX_FIELDS};
