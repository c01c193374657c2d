//! Error types for the knarr persistence core
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into three classes:
//! - Fatal configuration errors (`Schema`, `TypeMismatch`, `UnknownField`):
//!   raised at schema construction or at the serialize boundary.
//! - Fatal data errors (`Corruption`, `Serialization`): a row blob whose
//!   pointers or lengths fall outside the buffer, or a record too large for
//!   the wire format. No partial-row recovery is attempted.
//! - Propagated engine errors (`Storage`): failures from the underlying
//!   key-value engine, passed through untouched.

use thiserror::Error;

/// Result type alias for knarr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the knarr persistence core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid schema configuration (duplicate ids, non-dense ids, too many fields)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Value type does not match the field's declared type
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Declared field type
        expected: &'static str,
        /// Type of the supplied value
        actual: &'static str,
    },

    /// Field name not present in the schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Record cannot be encoded (payload exceeds wire-format limits)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Row blob is malformed (pointer or length past buffer end)
    #[error("Row corruption: {0}")]
    Corruption(String),

    /// Underlying key-value engine error
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema() {
        let err = Error::Schema("duplicate field id 3".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Schema error"));
        assert!(msg.contains("duplicate field id 3"));
    }

    #[test]
    fn test_error_display_type_mismatch() {
        let err = Error::TypeMismatch {
            field: "vector".to_string(),
            expected: "list<float32>",
            actual: "string",
        };
        let msg = err.to_string();
        assert!(msg.contains("vector"));
        assert!(msg.contains("list<float32>"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_error_display_corruption() {
        let err = Error::Corruption("pointer 512 past buffer end 40".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Row corruption"));
        assert!(msg.contains("512"));
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("batch write failed".to_string());
        assert!(err.to_string().contains("batch write failed"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        fn returns_error() -> Result<i32> {
            Err(Error::UnknownField("ghost".to_string()))
        }

        assert_eq!(returns_result().unwrap(), 42);
        assert!(returns_error().is_err());
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::TypeMismatch {
            field: "label".to_string(),
            expected: "int64",
            actual: "boolean",
        };

        match err {
            Error::TypeMismatch {
                field, expected, ..
            } => {
                assert_eq!(field, "label");
                assert_eq!(expected, "int64");
            }
            _ => panic!("Wrong error variant"),
        }
    }
}
