//! knarr-store: mutation ledger over an atomic multi-table engine
//!
//! ## Layout
//!
//! ```text
//! CandidateStore<E>                  manager.rs    orchestration, one batch per op
//!   ├── Candidate / CandidateCodec   candidate.rs  domain record + row codec
//!   ├── DeltaRecord / DeltaCodec     delta.rs      CDC change events + row codec
//!   ├── MultiTableEngine / BatchOp   engine.rs     engine abstraction
//!   └── MemoryEngine                 memory.rs     volatile reference engine
//! ```
//!
//! Three logical tables: candidates (label → row, source of truth), delta
//! (timestamp → change event, disposable), ttl (expiry timestamp + label
//! → label, consumed by the sweep). Every public mutation is one atomic
//! engine
//! batch; current state is always rebuildable from the candidates table
//! alone.

mod candidate;
mod convert;
mod delta;
mod engine;
mod manager;
mod memory;

pub use candidate::{Candidate, CandidateCodec};
pub use delta::{DeltaCodec, DeltaKind, DeltaRecord};
pub use engine::{BatchOp, MultiTableEngine, OpKind, Table};
pub use manager::{label_key, ts_key, ttl_key, CandidateStore};
pub use memory::MemoryEngine;
