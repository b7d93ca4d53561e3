//! Per-user record storage.
//!
//! [`DocumentStore`] is the backend: collections of JSON-shaped records kept
//! in Automerge documents on disk. [`WriteQueue`] serializes all writes
//! through one worker, and [`RecordStore`] is the typed, session-aware front
//! used for routines and recipes.

mod document;
mod hub;
mod record;
mod write_queue;

pub use document::{DocumentStore, StoreError};
pub use hub::{ChangeEvent, ChangeHub, ChangeKind};
pub use record::{Record, RecordStore, SubmitError};
pub use write_queue::{
    wait_all, WriteError, WriteFailure, WriteHandle, WriteOp, WriteOutcome, WriteQueue,
};
