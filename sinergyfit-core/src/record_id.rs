//! Record id generation.
//!
//! User-created routines and recipes get `<kind>-<timestampMillis>`. Exercises
//! get `ex-<timestampMillis>-<random>` because a routine creates several of them
//! within the same millisecond. Seed data uses fixed `<kind>-<n>` ids.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Kinds of records that receive generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Routine,
    Recipe,
    Exercise,
}

impl RecordKind {
    /// Id prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Routine => "routine",
            RecordKind::Recipe => "recipe",
            RecordKind::Exercise => "ex",
        }
    }
}

/// Generates a fresh id for a record created now.
pub fn generate_id(kind: RecordKind) -> String {
    generate_id_at(kind, Utc::now())
}

/// Generates an id for a record created at `at`.
pub fn generate_id_at(kind: RecordKind, at: DateTime<Utc>) -> String {
    match kind {
        RecordKind::Exercise => format!(
            "{}-{}-{}",
            kind.prefix(),
            at.timestamp_millis(),
            Uuid::new_v4().simple()
        ),
        _ => format!("{}-{}", kind.prefix(), at.timestamp_millis()),
    }
}
