//! Multi-table key-value engine interface
//!
//! The candidate store consumes an external engine exposing three logical
//! tables with positional batch reads, ordered range scans, and an atomic
//! multi-table batch write. The engine is the sole point of durability
//! and mutual exclusion; the store computes which rows belong in which
//! table and submits exactly one batch per logical operation.
//!
//! Keys are raw byte strings. The store encodes labels and nanosecond
//! timestamps as fixed-width big-endian integers; for the timestamp
//! tables the engine's lexicographic byte order then equals numeric
//! order.

use knarr_core::Result;

/// The three logical tables of the candidate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// label → encoded candidate row (the sole source of truth)
    Candidates,
    /// write timestamp → encoded delta record (derived, disposable)
    Delta,
    /// expiry timestamp + label → label (consumed by the expiry sweep)
    Ttl,
}

impl Table {
    /// Stable table name, usable as a key prefix by engine adapters.
    pub fn name(self) -> &'static str {
        match self {
            Table::Candidates => "cands",
            Table::Delta => "delta",
            Table::Ttl => "ttl",
        }
    }
}

/// Opcode of one batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Insert or overwrite
    Put,
    /// Remove (missing keys are no-ops)
    Delete,
}

/// One per-table operation inside an atomic batch.
///
/// For `Put`, `keys` and `values` are parallel; for `Delete`, `values`
/// is empty.
#[derive(Debug, Clone)]
pub struct BatchOp {
    /// Target table
    pub table: Table,
    /// Put or delete
    pub kind: OpKind,
    /// Affected keys
    pub keys: Vec<Vec<u8>>,
    /// Values parallel to `keys` (puts only)
    pub values: Vec<Vec<u8>>,
}

impl BatchOp {
    /// Build a put over parallel key/value lists.
    pub fn put(table: Table, keys: Vec<Vec<u8>>, values: Vec<Vec<u8>>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        BatchOp {
            table,
            kind: OpKind::Put,
            keys,
            values,
        }
    }

    /// Build a delete over a key list.
    pub fn delete(table: Table, keys: Vec<Vec<u8>>) -> Self {
        BatchOp {
            table,
            kind: OpKind::Delete,
            keys,
            values: Vec::new(),
        }
    }
}

/// Atomic multi-table key-value engine.
///
/// Implementations must apply `exec_sequence_batch_op` as one unit:
/// after a crash, either every operation in the sequence is visible or
/// none is. Range scans return entries in ascending key order.
pub trait MultiTableEngine: Send + Sync {
    /// Positional batch read; `None` for a missing key.
    fn read(&self, keys: &[Vec<u8>], table: Table) -> Result<Vec<Option<Vec<u8>>>>;

    /// Full scan of a table in key order.
    fn read_all(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Ordered scan of all entries with key ≥ `key`.
    fn seek_to_end(&self, key: &[u8], table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Ordered scan of all entries with key ≤ `key`.
    fn begin_to_seek(&self, key: &[u8], table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Delete keys; missing keys are silently skipped.
    fn delete(&self, keys: &[Vec<u8>], table: Table) -> Result<()>;

    /// Apply a sequence of per-table batch operations as one atomic unit.
    fn exec_sequence_batch_op(&self, ops: Vec<BatchOp>) -> Result<()>;
}
