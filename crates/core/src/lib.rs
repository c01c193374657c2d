//! Core types for the knarr persistence core
//!
//! This is the leaf crate of the workspace: the shared error type and the
//! typed field model that the row codec and the candidate store build on.
//! It has no dependency on the codec or the storage engine.

pub mod error;
pub mod field;

pub use error::{Error, Result};
pub use field::{FieldType, FieldValue};
