//! CandidateStore: consistent candidate / delta / TTL bookkeeping
//!
//! Orchestrates the three logical tables through the engine: every public
//! mutation reads whatever pre-images it needs, builds delta records, and
//! submits exactly one atomic batch. The store holds no lock and keeps no
//! state beyond its codecs; the engine's batch guarantee is the sole
//! crash-consistency mechanism (spec: all-or-nothing per call).
//!
//! ## Key encoding
//!
//! Candidates are keyed by the label's 8-byte big-endian form; the delta
//! table by the u64 nanosecond timestamp's 8-byte big-endian form; the
//! TTL table by the 8-byte expiry timestamp followed by the 8-byte label,
//! so one expiry instant can hold an entry per candidate without the
//! entries overwriting each other. For unsigned timestamps, fixed-width
//! big-endian keys make the engine's lexicographic order equal numeric
//! order structurally, so the range scans behind the CDC and TTL
//! protocols need no decoding. Labels are only ever point-looked-up, so
//! their signed byte order is irrelevant.
//!
//! ## Delta keys
//!
//! Keys within one batch are `base_ns + i`, so they are monotonic within
//! the batch. Across batches ordering follows the wall clock; a clock
//! that steps backwards can interleave batches. Known limitation, not a
//! correctness guarantee.

use crate::candidate::{Candidate, CandidateCodec};
use crate::delta::{DeltaCodec, DeltaRecord};
use crate::engine::{BatchOp, MultiTableEngine, Table};
use chrono::Utc;
use knarr_core::{Error, Result};
use tracing::debug;

/// Current wall clock in epoch nanoseconds.
fn now_ns() -> u64 {
    // i64 nanoseconds cover dates through 2262; non-negative since 1970.
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// Candidates-table key for a label.
pub fn label_key(label: i64) -> Vec<u8> {
    label.to_be_bytes().to_vec()
}

/// Delta-table key for a nanosecond timestamp.
pub fn ts_key(ns: u64) -> Vec<u8> {
    ns.to_be_bytes().to_vec()
}

/// TTL-table key: expiry timestamp plus label, so candidates sharing an
/// expiry instant keep distinct entries.
pub fn ttl_key(expire_ns: u64, label: i64) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&expire_ns.to_be_bytes());
    key.extend_from_slice(&label.to_be_bytes());
    key
}

/// Upper bound for a TTL scan: every key whose timestamp prefix is at
/// most `now_ns`, whatever its label suffix.
fn ttl_scan_bound(now_ns: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&now_ns.to_be_bytes());
    key.extend_from_slice(&[0xFF; 8]);
    key
}

fn label_from_key(key: &[u8]) -> Result<i64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| Error::Corruption(format!("label key has length {}, want 8", key.len())))?;
    Ok(i64::from_be_bytes(bytes))
}

/// The mutation ledger layer over an atomic multi-table engine.
///
/// Owned value, injected with its engine at construction — no global
/// lookup. All methods are synchronous blocking calls; concurrent callers
/// are serialized only by the engine itself.
pub struct CandidateStore<E: MultiTableEngine> {
    engine: E,
    candidates: CandidateCodec,
    deltas: DeltaCodec,
}

impl<E: MultiTableEngine> CandidateStore<E> {
    /// Create a store over the given engine.
    pub fn new(engine: E) -> Result<Self> {
        Ok(CandidateStore {
            engine,
            candidates: CandidateCodec::new()?,
            deltas: DeltaCodec::new()?,
        })
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Insert or update a batch of candidates.
    ///
    /// With `need_delta`, the prior payload of every label is read first
    /// and one UPSERT delta per candidate is appended alongside the
    /// writes (empty `old_fields` for brand-new labels). With `ttl_secs`
    /// > 0, every candidate is stamped `expire_ns_ts = now + ttl` and a
    /// TTL entry is written. All table writes go in one atomic batch.
    ///
    /// Returns the generated deltas (empty when `need_delta` is false).
    pub fn add_cands_data(
        &self,
        mut cands: Vec<Candidate>,
        ttl_secs: u64,
        need_delta: bool,
    ) -> Result<Vec<DeltaRecord>> {
        if cands.is_empty() {
            return Ok(Vec::new());
        }

        let mut deltas = Vec::new();
        let mut ops = Vec::new();

        if need_delta {
            let keys: Vec<Vec<u8>> = cands.iter().map(|c| label_key(c.label)).collect();
            let prior = self.engine.read(&keys, Table::Candidates)?;
            for (cand, old) in cands.iter().zip(&prior) {
                let old_fields = match old {
                    Some(bytes) => self.candidates.decode_fields(bytes)?,
                    None => String::new(),
                };
                deltas.push(DeltaRecord::upsert(cand, old_fields));
            }
            ops.push(self.delta_append_op(&deltas)?);
        }

        if ttl_secs > 0 {
            let expire_ns = now_ns().saturating_add(ttl_secs.saturating_mul(1_000_000_000));
            for cand in &mut cands {
                cand.expire_ns_ts = expire_ns as i64;
            }
        }

        ops.push(BatchOp::put(
            Table::Candidates,
            cands.iter().map(|c| label_key(c.label)).collect(),
            self.candidates.encode_batch(&cands)?,
        ));

        if ttl_secs > 0 {
            ops.push(BatchOp::put(
                Table::Ttl,
                cands
                    .iter()
                    .map(|c| ttl_key(c.expire_ns_ts as u64, c.label))
                    .collect(),
                cands.iter().map(|c| label_key(c.label)).collect(),
            ));
        }

        debug!(
            count = cands.len(),
            ttl_secs, need_delta, "add candidates batch"
        );
        self.engine.exec_sequence_batch_op(ops)?;
        Ok(deltas)
    }

    /// Remove candidates by label.
    ///
    /// Reads the pre-image payloads, appends one DELETE delta per label
    /// (if requested), and removes the candidate rows in one atomic
    /// batch. TTL entries referencing the labels are deliberately left
    /// behind; the expiry sweep skips them once their candidates are
    /// gone.
    pub fn delete_data(
        &self,
        labels: &[i64],
        need_record_delta: bool,
    ) -> Result<Vec<DeltaRecord>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<Vec<u8>> = labels.iter().map(|&l| label_key(l)).collect();
        let mut deltas = Vec::new();
        let mut ops = Vec::new();

        if need_record_delta {
            let prior = self.engine.read(&keys, Table::Candidates)?;
            for (&label, old) in labels.iter().zip(&prior) {
                let old_fields = match old {
                    Some(bytes) => self.candidates.decode_fields(bytes)?,
                    None => String::new(),
                };
                deltas.push(DeltaRecord::delete(label, old_fields));
            }
            ops.push(self.delta_append_op(&deltas)?);
        }

        ops.push(BatchOp::delete(Table::Candidates, keys));

        debug!(count = labels.len(), need_record_delta, "delete candidates batch");
        self.engine.exec_sequence_batch_op(ops)?;
        Ok(deltas)
    }

    /// Positional batch fetch; a missing label yields `None`, never an
    /// error.
    pub fn fetch_cands_data(&self, labels: &[i64]) -> Result<Vec<Option<Candidate>>> {
        let keys: Vec<Vec<u8>> = labels.iter().map(|&l| label_key(l)).collect();
        let rows = self.engine.read(&keys, Table::Candidates)?;
        rows.iter()
            .map(|row| match row {
                Some(bytes) => Ok(Some(self.candidates.decode(bytes)?)),
                None => Ok(None),
            })
            .collect()
    }

    /// Full scan of the candidates table.
    ///
    /// The rebuild path for any derived structure (e.g. a vector index):
    /// current state is reconstructible from this alone.
    pub fn get_all_cands_data(&self) -> Result<Vec<Candidate>> {
        let kvs = self.engine.read_all(Table::Candidates)?;
        kvs.iter()
            .map(|(_, bytes)| self.candidates.decode(bytes))
            .collect()
    }

    /// All delta records with timestamp key strictly greater than `ns_ts`.
    pub fn get_delta_data_after_ts(&self, ns_ts: u64) -> Result<Vec<DeltaRecord>> {
        let start = ts_key(ns_ts.saturating_add(1));
        let kvs = self.engine.seek_to_end(&start, Table::Delta)?;
        kvs.iter()
            .map(|(_, bytes)| self.deltas.decode(bytes))
            .collect()
    }

    /// Remove delta records with timestamp key ≤ `ns_ts`; returns the
    /// trimmed records.
    ///
    /// Together with `get_delta_data_after_ts` this gives a CDC consumer
    /// a checkpoint-and-trim protocol: read past the checkpoint, then
    /// once durably consumed, trim up to it.
    pub fn delete_delta_data_before_ts(&self, ns_ts: u64) -> Result<Vec<DeltaRecord>> {
        let kvs = self.engine.begin_to_seek(&ts_key(ns_ts), Table::Delta)?;
        let records: Vec<DeltaRecord> = kvs
            .iter()
            .map(|(_, bytes)| self.deltas.decode(bytes))
            .collect::<Result<_>>()?;
        let keys: Vec<Vec<u8>> = kvs.into_iter().map(|(k, _)| k).collect();
        debug!(count = keys.len(), "trim delta log");
        self.engine.delete(&keys, Table::Delta)?;
        Ok(records)
    }

    /// Expire candidates whose TTL has elapsed, using the wall clock.
    pub fn expire_data(&self) -> Result<Vec<DeltaRecord>> {
        self.expire_data_at(now_ns())
    }

    /// Expire candidates whose TTL has elapsed as of `now_ns`.
    ///
    /// Scans the TTL table up to `now_ns`, re-validates each label's
    /// stored `expire_ns_ts` against the candidate row itself (a stale or
    /// duplicate TTL entry must not evict a re-added candidate with a
    /// later expiry), then atomically deletes the expired candidates,
    /// appends their DELETE deltas, and removes every consumed TTL entry.
    /// Orphaned entries whose candidate is already gone are consumed as
    /// no-ops.
    pub fn expire_data_at(&self, now_ns: u64) -> Result<Vec<DeltaRecord>> {
        let ttl_kvs = self.engine.begin_to_seek(&ttl_scan_bound(now_ns), Table::Ttl)?;
        if ttl_kvs.is_empty() {
            return Ok(Vec::new());
        }

        let cand_keys: Vec<Vec<u8>> = ttl_kvs.iter().map(|(_, label)| label.clone()).collect();
        let rows = self.engine.read(&cand_keys, Table::Candidates)?;

        let mut deltas = Vec::new();
        let mut expired_keys = Vec::new();
        for ((_, label_bytes), row) in ttl_kvs.iter().zip(&rows) {
            let Some(bytes) = row else {
                continue;
            };
            let expire_ns = self.candidates.decode_expire_ns_ts(bytes)?;
            if expire_ns as u64 <= now_ns {
                let label = label_from_key(label_bytes)?;
                let old_fields = self.candidates.decode_fields(bytes)?;
                deltas.push(DeltaRecord::delete(label, old_fields));
                expired_keys.push(label_bytes.clone());
            }
        }

        let mut ops = Vec::new();
        if !deltas.is_empty() {
            ops.push(BatchOp::delete(Table::Candidates, expired_keys));
            ops.push(self.delta_append_op(&deltas)?);
        }
        ops.push(BatchOp::delete(
            Table::Ttl,
            ttl_kvs.into_iter().map(|(k, _)| k).collect(),
        ));

        debug!(expired = deltas.len(), "ttl sweep");
        self.engine.exec_sequence_batch_op(ops)?;
        Ok(deltas)
    }

    /// Drop every candidate, delta, and TTL entry in one atomic batch.
    ///
    /// No deltas are recorded: a cleared store has no history to replay.
    pub fn clear(&self) -> Result<()> {
        let mut ops = Vec::new();
        for table in [Table::Candidates, Table::Delta, Table::Ttl] {
            let keys: Vec<Vec<u8>> = self
                .engine
                .read_all(table)?
                .into_iter()
                .map(|(k, _)| k)
                .collect();
            if !keys.is_empty() {
                ops.push(BatchOp::delete(table, keys));
            }
        }
        if ops.is_empty() {
            return Ok(());
        }
        debug!("clear all tables");
        self.engine.exec_sequence_batch_op(ops)?;
        Ok(())
    }

    /// Build the delta-table append for a batch of records: one put per
    /// record, keyed `base_ns + i`.
    fn delta_append_op(&self, deltas: &[DeltaRecord]) -> Result<BatchOp> {
        let base_ns = now_ns();
        let keys = (0..deltas.len() as u64)
            .map(|i| ts_key(base_ns.saturating_add(i)))
            .collect();
        Ok(BatchOp::put(
            Table::Delta,
            keys,
            self.deltas.encode_batch(deltas)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::DeltaKind;
    use crate::memory::MemoryEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn store() -> CandidateStore<MemoryEngine> {
        CandidateStore::new(MemoryEngine::new()).unwrap()
    }

    fn cand(label: i64, payload: &str) -> Candidate {
        Candidate {
            label,
            vector: vec![0.1, 0.2],
            sparse_raw_terms: vec!["term".into()],
            sparse_values: vec![0.5],
            fields: payload.to_string(),
            expire_ns_ts: 0,
            is_deleted: false,
        }
    }

    #[test]
    fn test_add_then_fetch() {
        let store = store();
        store
            .add_cands_data(vec![cand(1, "one"), cand(2, "two")], 0, true)
            .unwrap();

        let got = store.fetch_cands_data(&[1, 2, 3]).unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].as_ref().unwrap().fields, "one");
        assert_eq!(got[1].as_ref().unwrap().fields, "two");
        assert!(got[2].is_none());
    }

    #[test]
    fn test_delta_completeness_new_and_updated() {
        let store = store();

        // Brand-new labels: empty old_fields.
        let deltas = store
            .add_cands_data(vec![cand(1, "v1"), cand(2, "v1")], 0, true)
            .unwrap();
        assert_eq!(deltas.len(), 2);
        for delta in &deltas {
            assert_eq!(delta.kind, DeltaKind::Upsert);
            assert_eq!(delta.old_fields, "");
        }

        // Updated label: previous payload as pre-image.
        let deltas = store.add_cands_data(vec![cand(1, "v2")], 0, true).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].fields, "v2");
        assert_eq!(deltas[0].old_fields, "v1");
    }

    #[test]
    fn test_need_delta_false_writes_no_deltas() {
        let store = store();
        let deltas = store.add_cands_data(vec![cand(1, "x")], 0, false).unwrap();
        assert!(deltas.is_empty());
        assert!(store.get_delta_data_after_ts(0).unwrap().is_empty());
        // The candidate itself is still written.
        assert!(store.fetch_cands_data(&[1]).unwrap()[0].is_some());
    }

    #[test]
    fn test_delete_then_fetch_empty_slot() {
        let store = store();
        store.add_cands_data(vec![cand(5, "p")], 0, true).unwrap();

        let deltas = store.delete_data(&[5], true).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].kind, DeltaKind::Delete);
        assert_eq!(deltas[0].old_fields, "p");

        assert!(store.fetch_cands_data(&[5]).unwrap()[0].is_none());
    }

    #[test]
    fn test_delete_missing_label_records_empty_preimage() {
        let store = store();
        let deltas = store.delete_data(&[404], true).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].old_fields, "");
    }

    #[test]
    fn test_get_all_cands_data() {
        let store = store();
        store
            .add_cands_data(vec![cand(3, "c"), cand(1, "a"), cand(2, "b")], 0, false)
            .unwrap();
        let all = store.get_all_cands_data().unwrap();
        assert_eq!(all.len(), 3);
        let mut labels: Vec<i64> = all.iter().map(|c| c.label).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec![1, 2, 3]);
    }

    #[test]
    fn test_delta_checkpoint_and_trim() {
        let store = store();
        store.add_cands_data(vec![cand(1, "a")], 0, true).unwrap();
        store.add_cands_data(vec![cand(2, "b")], 0, true).unwrap();

        let all = store.get_delta_data_after_ts(0).unwrap();
        assert_eq!(all.len(), 2);

        // Find the midpoint: trim everything up to the first delta.
        let kvs = store.engine().read_all(Table::Delta).unwrap();
        let first_ts = u64::from_be_bytes(kvs[0].0.clone().try_into().unwrap());

        let trimmed = store.delete_delta_data_before_ts(first_ts).unwrap();
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0].label, 1);

        let rest = store.get_delta_data_after_ts(0).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].label, 2);

        // Strictly-greater-than bound: asking after the last key is empty.
        let kvs = store.engine().read_all(Table::Delta).unwrap();
        let last_ts = u64::from_be_bytes(kvs[0].0.clone().try_into().unwrap());
        assert!(store.get_delta_data_after_ts(last_ts).unwrap().is_empty());
    }

    #[test]
    fn test_ttl_sweep_exactness() {
        let store = store();
        let base = now_ns();

        store
            .add_cands_data(vec![cand(1, "short"), cand(2, "short")], 1, true)
            .unwrap();
        store
            .add_cands_data(vec![cand(3, "long")], 3600, true)
            .unwrap();

        // Past the 1s TTL, before the 1h TTL.
        let deltas = store.expire_data_at(base + 2_000_000_000).unwrap();
        assert_eq!(deltas.len(), 2);
        let mut labels: Vec<i64> = deltas.iter().map(|d| d.label).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec![1, 2]);
        for delta in &deltas {
            assert_eq!(delta.kind, DeltaKind::Delete);
            assert_eq!(delta.old_fields, "short");
        }

        let got = store.fetch_cands_data(&[1, 2, 3]).unwrap();
        assert!(got[0].is_none());
        assert!(got[1].is_none());
        assert!(got[2].is_some());

        // Consumed TTL entries are gone: an immediate second sweep is a
        // no-op.
        let again = store.expire_data_at(base + 2_000_000_000).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_ttl_batch_keeps_one_entry_per_candidate() {
        let store = store();
        let base = now_ns();

        // Candidates added in one batch share an expiry instant; each
        // still gets its own TTL entry.
        store
            .add_cands_data(vec![cand(1, "a"), cand(2, "b")], 1, false)
            .unwrap();
        assert_eq!(store.engine().read_all(Table::Ttl).unwrap().len(), 2);

        let deltas = store.expire_data_at(base + 2_000_000_000).unwrap();
        let mut labels: Vec<i64> = deltas.iter().map(|d| d.label).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec![1, 2]);

        let got = store.fetch_cands_data(&[1, 2]).unwrap();
        assert!(got[0].is_none());
        assert!(got[1].is_none());
    }

    #[test]
    fn test_clear_empties_every_table() {
        let store = store();
        store.add_cands_data(vec![cand(1, "a")], 60, true).unwrap();

        store.clear().unwrap();
        assert!(store.get_all_cands_data().unwrap().is_empty());
        assert!(store.get_delta_data_after_ts(0).unwrap().is_empty());
        assert!(store.engine().read_all(Table::Ttl).unwrap().is_empty());

        // Clearing an already-empty store is a no-op.
        store.clear().unwrap();
    }

    #[test]
    fn test_expire_with_nothing_due() {
        let store = store();
        store.add_cands_data(vec![cand(1, "x")], 3600, true).unwrap();
        assert!(store.expire_data().unwrap().is_empty());
        assert!(store.fetch_cands_data(&[1]).unwrap()[0].is_some());
    }

    #[test]
    fn test_orphaned_ttl_entry_skipped() {
        let store = store();
        let base = now_ns();
        store.add_cands_data(vec![cand(9, "x")], 1, true).unwrap();

        // Explicit delete leaves the TTL entry behind.
        store.delete_data(&[9], false).unwrap();

        let deltas = store.expire_data_at(base + 2_000_000_000).unwrap();
        assert!(deltas.is_empty());
        // The orphaned entry was still consumed.
        assert!(store.engine().read_all(Table::Ttl).unwrap().is_empty());
    }

    #[test]
    fn test_stale_ttl_entry_does_not_evict_readded_candidate() {
        let store = store();
        let base = now_ns();
        store.add_cands_data(vec![cand(7, "v1")], 1, true).unwrap();
        // Re-add with a much later expiry; the old TTL entry is now stale.
        store
            .add_cands_data(vec![cand(7, "v2")], 3600, true)
            .unwrap();

        let deltas = store.expire_data_at(base + 2_000_000_000).unwrap();
        assert!(deltas.is_empty());
        assert_eq!(
            store.fetch_cands_data(&[7]).unwrap()[0].as_ref().unwrap().fields,
            "v2"
        );
    }

    #[test]
    fn test_ttl_stamps_expiry_on_candidates() {
        let store = store();
        let before = now_ns();
        store.add_cands_data(vec![cand(1, "x")], 60, false).unwrap();
        let got = store.fetch_cands_data(&[1]).unwrap()[0].clone().unwrap();
        let expire = got.expire_ns_ts as u64;
        assert!(expire >= before + 60_000_000_000);
        assert!(expire <= now_ns() + 60_000_000_000);
    }

    #[test]
    fn test_empty_batches_are_no_ops() {
        let store = store();
        assert!(store.add_cands_data(vec![], 10, true).unwrap().is_empty());
        assert!(store.delete_data(&[], true).unwrap().is_empty());
        assert!(store.fetch_cands_data(&[]).unwrap().is_empty());
    }

    // Engine wrapper that counts batch submissions and can be told to
    // fail, for the atomicity/propagation contracts.
    struct CountingEngine {
        inner: MemoryEngine,
        batches: Arc<AtomicUsize>,
        fail_batches: bool,
    }

    impl MultiTableEngine for CountingEngine {
        fn read(&self, keys: &[Vec<u8>], table: Table) -> knarr_core::Result<Vec<Option<Vec<u8>>>> {
            self.inner.read(keys, table)
        }
        fn read_all(&self, table: Table) -> knarr_core::Result<Vec<(Vec<u8>, Vec<u8>)>> {
            self.inner.read_all(table)
        }
        fn seek_to_end(&self, key: &[u8], table: Table) -> knarr_core::Result<Vec<(Vec<u8>, Vec<u8>)>> {
            self.inner.seek_to_end(key, table)
        }
        fn begin_to_seek(&self, key: &[u8], table: Table) -> knarr_core::Result<Vec<(Vec<u8>, Vec<u8>)>> {
            self.inner.begin_to_seek(key, table)
        }
        fn delete(&self, keys: &[Vec<u8>], table: Table) -> knarr_core::Result<()> {
            self.inner.delete(keys, table)
        }
        fn exec_sequence_batch_op(&self, ops: Vec<BatchOp>) -> knarr_core::Result<()> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            if self.fail_batches {
                return Err(Error::Storage("injected batch failure".into()));
            }
            self.inner.exec_sequence_batch_op(ops)
        }
    }

    #[test]
    fn test_each_mutation_is_one_batch() {
        let batches = Arc::new(AtomicUsize::new(0));
        let store = CandidateStore::new(CountingEngine {
            inner: MemoryEngine::new(),
            batches: batches.clone(),
            fail_batches: false,
        })
        .unwrap();

        store
            .add_cands_data(vec![cand(1, "a"), cand(2, "b")], 5, true)
            .unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 1);

        store.delete_data(&[1, 2], true).unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 2);

        // The orphaned TTL entries sit 5s in the future, so a wall-clock
        // sweep scans nothing and submits no batch.
        store.expire_data().unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 2);

        // Once they are due, consuming them is one batch even though no
        // candidate expires.
        store.expire_data_at(now_ns() + 10_000_000_000).unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_engine_failure_propagates_untouched() {
        let store = CandidateStore::new(CountingEngine {
            inner: MemoryEngine::new(),
            batches: Arc::new(AtomicUsize::new(0)),
            fail_batches: true,
        })
        .unwrap();

        let err = store.add_cands_data(vec![cand(1, "x")], 0, true).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("injected batch failure"));
    }
}
