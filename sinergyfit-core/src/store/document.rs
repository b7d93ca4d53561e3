//! File-backed document store for per-user collections.
//!
//! Each `(user, collection)` pair is one Automerge document kept in memory
//! after first use. Every operation runs under a single async mutex: load (if
//! not cached) or merge in what is on disk, mutate, persist. Saving merges the
//! on-disk copy again, so stores in other processes sharing the data
//! directory do not overwrite each other. A failed mutation evicts the cached
//! document so the next operation starts again from what is on disk.

use automerge::{
    transaction::Transactable, AutoCommit, AutomergeError, ObjType, ReadDoc, Value as AmValue,
    ROOT,
};
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

use super::hub::{ChangeEvent, ChangeHub, ChangeKind};
use crate::automerge::{get_json, put_json, put_path, Collection, StorageError, UserDocStorage};
use crate::session::UserId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("automerge error: {0}")]
    Automerge(#[from] AutomergeError),

    #[error("document '{id}' not found in {collection}")]
    DocumentNotFound { collection: Collection, id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

type DocKey = (UserId, Collection);

pub struct DocumentStore {
    storage: UserDocStorage,
    docs: Mutex<HashMap<DocKey, AutoCommit>>,
    hub: ChangeHub,
}

impl DocumentStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            storage: UserDocStorage::new(data_dir),
            docs: Mutex::new(HashMap::new()),
            hub: ChangeHub::new(),
        }
    }

    pub fn storage(&self) -> &UserDocStorage {
        &self.storage
    }

    fn cached<'a>(
        storage: &UserDocStorage,
        docs: &'a mut HashMap<DocKey, AutoCommit>,
        uid: &UserId,
        collection: Collection,
    ) -> Result<&'a mut AutoCommit, StoreError> {
        match docs.entry((uid.clone(), collection)) {
            Entry::Occupied(entry) => {
                let doc = entry.into_mut();
                storage.refresh(uid, collection, doc)?;
                Ok(doc)
            }
            Entry::Vacant(entry) => {
                let doc = storage.load_or_create(uid, collection)?;
                tracing::debug!("Loaded {} for {}", collection, uid);
                Ok(entry.insert(doc))
            }
        }
    }

    /// Runs `f` on the cached document and persists it when `f` reports a change.
    async fn mutate<T>(
        &self,
        uid: &UserId,
        collection: Collection,
        f: impl FnOnce(&mut AutoCommit) -> Result<(T, bool), StoreError>,
    ) -> Result<T, StoreError> {
        let mut docs = self.docs.lock().await;
        let doc = Self::cached(&self.storage, &mut docs, uid, collection)?;

        let result = match f(&mut *doc) {
            Ok((value, true)) => self
                .storage
                .save(uid, collection, doc)
                .map(|_| value)
                .map_err(StoreError::from),
            Ok((value, false)) => Ok(value),
            Err(e) => Err(e),
        };

        if result.is_err() {
            docs.remove(&(uid.clone(), collection));
        }
        result
    }

    /// All records of a collection as `(id, payload)` pairs.
    pub async fn list(
        &self,
        uid: &UserId,
        collection: Collection,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let mut docs = self.docs.lock().await;
        let doc: &AutoCommit = Self::cached(&self.storage, &mut docs, uid, collection)?;

        let mut records = Vec::new();
        for key in doc.keys(ROOT) {
            if let Some(value) = get_json(doc, &ROOT, &key)? {
                records.push((key, value));
            }
        }
        Ok(records)
    }

    pub async fn get(
        &self,
        uid: &UserId,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let mut docs = self.docs.lock().await;
        let doc: &AutoCommit = Self::cached(&self.storage, &mut docs, uid, collection)?;
        Ok(get_json(doc, &ROOT, id)?)
    }

    /// Overlays the top-level fields of `payload` onto the record `id`,
    /// creating the record if needed. Fields absent from `payload` are kept.
    pub async fn merge_write(
        &self,
        uid: &UserId,
        collection: Collection,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.mutate(uid, collection, |doc| {
            let existing = match doc.get(ROOT, id)? {
                Some((AmValue::Object(ObjType::Map), obj)) => Some(obj),
                _ => None,
            };
            let obj = match existing {
                Some(obj) => obj,
                None => doc.put_object(ROOT, id, ObjType::Map)?,
            };
            for (key, value) in payload {
                put_json(doc, &obj, key, value)?;
            }
            Ok(((), true))
        })
        .await?;

        self.notify(uid, collection, id, ChangeKind::Upserted).await;
        Ok(())
    }

    /// Sets one nested field of an existing record.
    ///
    /// Fails with [`StoreError::DocumentNotFound`] if the record does not exist.
    pub async fn update_field(
        &self,
        uid: &UserId,
        collection: Collection,
        id: &str,
        path: &[String],
        value: &Value,
    ) -> Result<(), StoreError> {
        self.mutate(uid, collection, |doc| {
            let obj = match doc.get(ROOT, id)? {
                Some((AmValue::Object(ObjType::Map), obj)) => obj,
                _ => {
                    return Err(StoreError::DocumentNotFound {
                        collection,
                        id: id.to_string(),
                    })
                }
            };
            put_path(doc, &obj, path, value)?;
            Ok(((), true))
        })
        .await?;

        self.notify(uid, collection, id, ChangeKind::Upserted).await;
        Ok(())
    }

    /// Writes `payload` as record `id` unless it already exists.
    ///
    /// Returns whether the record was created.
    pub async fn create_if_absent(
        &self,
        uid: &UserId,
        collection: Collection,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let created = self
            .mutate(uid, collection, |doc| {
                if doc.get(ROOT, id)?.is_some() {
                    return Ok((false, false));
                }
                put_json(doc, &ROOT, id, &Value::Object(payload.clone()))?;
                Ok((true, true))
            })
            .await?;

        if created {
            self.notify(uid, collection, id, ChangeKind::Upserted).await;
        }
        Ok(created)
    }

    /// Removes record `id`. Returns whether it existed.
    pub async fn delete(
        &self,
        uid: &UserId,
        collection: Collection,
        id: &str,
    ) -> Result<bool, StoreError> {
        let removed = self
            .mutate(uid, collection, |doc| {
                if doc.get(ROOT, id)?.is_none() {
                    return Ok((false, false));
                }
                doc.delete(ROOT, id)?;
                Ok((true, true))
            })
            .await?;

        if removed {
            self.notify(uid, collection, id, ChangeKind::Deleted).await;
        }
        Ok(removed)
    }

    pub async fn subscribe(
        &self,
        uid: &UserId,
        collection: Collection,
    ) -> broadcast::Receiver<ChangeEvent> {
        self.hub.subscribe(uid, collection).await
    }

    async fn notify(&self, uid: &UserId, collection: Collection, id: &str, kind: ChangeKind) {
        self.hub
            .publish(ChangeEvent {
                uid: uid.clone(),
                collection,
                id: id.to_string(),
                kind,
            })
            .await;
    }
}
