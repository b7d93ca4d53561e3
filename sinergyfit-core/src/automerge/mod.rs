//! Automerge document handling for SinergyFit.
//!
//! Every user collection is one Automerge document whose root maps record
//! ids to record objects.
//!
//! # Document Storage
//!
//! Documents are stored per user in the data directory:
//! - `users/<uid>/routines.automerge`: Map of routine id -> Routine object
//! - `users/<uid>/recipes.automerge`: Map of recipe id -> Recipe object
//! - `users/<uid>/mealplans.automerge`: Map of plan id -> weekly plan object

mod codec;
mod collection;
mod storage;

pub use codec::{get_json, put_json, put_path, read_json};
pub use collection::Collection;
pub use storage::{StorageError, UserDocStorage};
