//! Typed access to a user's routines and recipes.
//!
//! Every operation is addressed to the signed-in user. Without one, writes
//! resolve as [`WriteOutcome::Skipped`](super::WriteOutcome::Skipped) and
//! reads return nothing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

use super::document::{DocumentStore, StoreError};
use super::hub::ChangeEvent;
use super::write_queue::{WriteHandle, WriteOp, WriteQueue};
use crate::automerge::Collection;
use crate::models::{Recipe, Routine};
use crate::record_id::{generate_id, RecordKind};
use crate::session::Session;
use crate::validation::ValidationError;

/// Reasons a write is refused before it is queued.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A record kept in a user collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn is_preloaded(&self) -> bool;
    fn set_preloaded(&mut self, preloaded: bool);
    fn validate(&self) -> Result<(), ValidationError>;

    /// Fills in ids for nested items that have none.
    fn assign_ids(&mut self) {}
}

impl Record for Routine {
    const COLLECTION: Collection = Collection::Routines;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_preloaded(&self) -> bool {
        self.is_preloaded
    }

    fn set_preloaded(&mut self, preloaded: bool) {
        self.is_preloaded = preloaded;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Routine::validate(self)
    }

    fn assign_ids(&mut self) {
        for exercise in &mut self.exercises {
            if exercise.id.trim().is_empty() {
                exercise.id = generate_id(RecordKind::Exercise);
            }
        }
    }
}

impl Record for Recipe {
    const COLLECTION: Collection = Collection::Recipes;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_preloaded(&self) -> bool {
        self.is_preloaded
    }

    fn set_preloaded(&mut self, preloaded: bool) {
        self.is_preloaded = preloaded;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Recipe::validate(self)
    }
}

/// Serializes `value` as an object payload with the `id` field removed.
pub(crate) fn to_payload<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(serde::ser::Error::custom(format!(
            "expected an object payload, got {}",
            other
        ))),
    }
}

/// Decodes a stored payload, re-attaching its id.
pub(crate) fn from_payload<T: DeserializeOwned>(id: &str, value: Value) -> Option<T> {
    let Value::Object(mut map) = value else {
        tracing::warn!("Skipping {}: stored value is not an object", id);
        return None;
    };
    map.insert("id".into(), Value::String(id.to_string()));

    match serde_json::from_value(Value::Object(map)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Skipping {}: {}", id, e);
            None
        }
    }
}

/// Create, update, delete and read records of one kind for the signed-in user.
pub struct RecordStore<R: Record> {
    session: Session,
    store: Arc<DocumentStore>,
    queue: WriteQueue,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            store: self.store.clone(),
            queue: self.queue.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new(session: Session, store: Arc<DocumentStore>, queue: WriteQueue) -> Self {
        Self {
            session,
            store,
            queue,
            _record: PhantomData,
        }
    }

    /// Saves a new user record. Always stored as not preloaded.
    pub fn add(&self, mut record: R) -> Result<WriteHandle, SubmitError> {
        record.set_preloaded(false);
        record.assign_ids();
        record.validate()?;

        let Some(uid) = self.session.user_id() else {
            tracing::debug!("Not signed in, skipping add of {}", record.id());
            return Ok(WriteHandle::skipped());
        };

        let op = WriteOp::MergeWrite {
            collection: R::COLLECTION,
            id: record.id().to_string(),
            payload: to_payload(&record)?,
        };
        Ok(self.queue.submit(uid, op))
    }

    /// Overlays `record` onto the stored one. Preloaded records are refused.
    pub fn update(&self, record: &R) -> Result<WriteHandle, SubmitError> {
        if record.is_preloaded() {
            return Err(ValidationError::Preloaded(record.id().to_string()).into());
        }
        record.validate()?;

        let Some(uid) = self.session.user_id() else {
            tracing::debug!("Not signed in, skipping update of {}", record.id());
            return Ok(WriteHandle::skipped());
        };

        let mut record = record.clone();
        record.assign_ids();
        let op = WriteOp::MergeWrite {
            collection: R::COLLECTION,
            id: record.id().to_string(),
            payload: to_payload(&record)?,
        };
        Ok(self.queue.submit(uid, op))
    }

    /// Removes a record. Deleting an id that does not exist is not an error.
    pub fn delete(&self, id: &str) -> WriteHandle {
        let Some(uid) = self.session.user_id() else {
            tracing::debug!("Not signed in, skipping delete of {}", id);
            return WriteHandle::skipped();
        };

        self.queue.submit(
            uid,
            WriteOp::Delete {
                collection: R::COLLECTION,
                id: id.to_string(),
            },
        )
    }

    /// All stored records of the signed-in user, sorted by id.
    pub async fn list(&self) -> Result<Vec<R>, StoreError> {
        let Some(uid) = self.session.user_id() else {
            return Ok(Vec::new());
        };

        let mut records: Vec<R> = self
            .store
            .list(&uid, R::COLLECTION)
            .await?
            .into_iter()
            .filter_map(|(id, value)| from_payload(&id, value))
            .collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        let Some(uid) = self.session.user_id() else {
            return Ok(None);
        };

        Ok(self
            .store
            .get(&uid, R::COLLECTION, id)
            .await?
            .and_then(|value| from_payload(id, value)))
    }

    /// Change notifications for this collection, or `None` when signed out.
    pub async fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        let uid = self.session.user_id()?;
        Some(self.store.subscribe(&uid, R::COLLECTION).await)
    }
}
