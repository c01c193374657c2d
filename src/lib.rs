//! Knarr: local persistence core for a context/vector database
//!
//! The facade crate. Re-exports the three layers:
//!
//! - [`knarr_core`]: field types, values, errors
//! - [`knarr_codec`]: schema-driven binary row codec
//! - [`knarr_store`]: candidate store, delta log, TTL expiry over an
//!   atomic multi-table engine
//!
//! ## Quick start
//!
//! ```
//! use knarr::store::{Candidate, CandidateStore, MemoryEngine};
//!
//! # fn main() -> knarr::Result<()> {
//! let store = CandidateStore::new(MemoryEngine::new())?;
//!
//! let mut cand = Candidate::new(42);
//! cand.vector = vec![0.1, 0.2, 0.3];
//! cand.fields = "{\"title\":\"hello\"}".to_string();
//! store.add_cands_data(vec![cand], 0, true)?;
//!
//! let got = store.fetch_cands_data(&[42])?;
//! assert!(got[0].is_some());
//! # Ok(())
//! # }
//! ```

pub use knarr_core::{Error, FieldType, FieldValue, Result};

/// Schema-driven binary row codec.
pub mod codec {
    pub use knarr_codec::{FieldMeta, FieldSpec, Row, RowCodec, Schema, MAX_FIELDS};
}

/// Candidate store, delta log, and TTL expiry.
pub mod store {
    pub use knarr_store::{
        label_key, ts_key, ttl_key, BatchOp, Candidate, CandidateCodec, CandidateStore,
        DeltaCodec, DeltaKind, DeltaRecord, MemoryEngine, MultiTableEngine, OpKind, Table,
    };
}
