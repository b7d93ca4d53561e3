//! SinergyFit Core Library
//!
//! Routines, recipes and the weekly meal plan, stored per user.

pub mod account;
pub mod automerge;
pub mod library;
pub mod models;
pub mod planner;
pub mod reconcile;
pub mod record_id;
pub mod seed;
pub mod session;
pub mod store;
pub mod validation;

pub use account::Account;
pub use automerge::{Collection, StorageError, UserDocStorage};
pub use library::Library;
pub use models::{DayPlan, Exercise, MealSlot, Recipe, Routine, Weekday, WeeklyPlan};
pub use planner::{plan_id, MealPlanner};
pub use reconcile::{reconcile, Reconcilable};
pub use record_id::{generate_id, RecordKind};
pub use session::{AuthState, Session, User, UserId, UserIdError};
pub use store::{
    wait_all, ChangeEvent, ChangeKind, DocumentStore, Record, RecordStore, StoreError,
    SubmitError, WriteError, WriteFailure, WriteHandle, WriteOp, WriteOutcome, WriteQueue,
};
pub use validation::ValidationError;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
