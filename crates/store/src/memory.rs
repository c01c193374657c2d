//! In-memory reference engine
//!
//! A volatile `MultiTableEngine`: one ordered map per table behind a
//! single `RwLock`. Batch sequences apply under one write-lock hold, so
//! the all-or-nothing contract is trivially met. This is the engine for
//! tests and embedders that need no persistence; a durable deployment
//! plugs in an adapter over a real key-value store instead.

use crate::engine::{BatchOp, MultiTableEngine, OpKind, Table};
use knarr_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;

type TableMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile in-memory multi-table engine.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: RwLock<[TableMap; 3]>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        MemoryEngine::default()
    }

    fn index(table: Table) -> usize {
        match table {
            Table::Candidates => 0,
            Table::Delta => 1,
            Table::Ttl => 2,
        }
    }
}

impl MultiTableEngine for MemoryEngine {
    fn read(&self, keys: &[Vec<u8>], table: Table) -> Result<Vec<Option<Vec<u8>>>> {
        let tables = self.tables.read();
        let map = &tables[Self::index(table)];
        Ok(keys.iter().map(|key| map.get(key).cloned()).collect())
    }

    fn read_all(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let tables = self.tables.read();
        let map = &tables[Self::index(table)];
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn seek_to_end(&self, key: &[u8], table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let tables = self.tables.read();
        let map = &tables[Self::index(table)];
        Ok(map
            .range(key.to_vec()..)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn begin_to_seek(&self, key: &[u8], table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let tables = self.tables.read();
        let map = &tables[Self::index(table)];
        Ok(map
            .range(..=key.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn delete(&self, keys: &[Vec<u8>], table: Table) -> Result<()> {
        let mut tables = self.tables.write();
        let map = &mut tables[Self::index(table)];
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }

    fn exec_sequence_batch_op(&self, ops: Vec<BatchOp>) -> Result<()> {
        // One write-lock hold for the whole sequence: readers observe all
        // of the batch or none of it.
        let mut tables = self.tables.write();
        for op in &ops {
            if op.kind == OpKind::Put && op.keys.len() != op.values.len() {
                return Err(Error::Storage(format!(
                    "batch put on table '{}' has {} keys but {} values",
                    op.table.name(),
                    op.keys.len(),
                    op.values.len()
                )));
            }
        }
        for op in ops {
            let map = &mut tables[Self::index(op.table)];
            match op.kind {
                OpKind::Put => {
                    for (key, value) in op.keys.into_iter().zip(op.values) {
                        map.insert(key, value);
                    }
                }
                OpKind::Delete => {
                    for key in op.keys {
                        map.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
