//! The single ordered background writer.
//!
//! Record and plan edits are fire-and-forget: callers get a [`WriteHandle`]
//! back immediately and may await it or drop it. A write runs to completion
//! either way. One worker task applies writes in submission order, so two
//! edits issued one after the other reach the store in that order.
//!
//! Failed writes are logged, resolved on their handle, and pushed to the
//! failure sink if one was configured.

use futures::future::join_all;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::document::{DocumentStore, StoreError};
use crate::automerge::Collection;
use crate::session::UserId;

/// A write against one record of a user collection.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    MergeWrite {
        collection: Collection,
        id: String,
        payload: Map<String, Value>,
    },
    UpdateField {
        collection: Collection,
        id: String,
        path: Vec<String>,
        value: Value,
    },
    CreateIfAbsent {
        collection: Collection,
        id: String,
        payload: Map<String, Value>,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::MergeWrite { collection, .. }
            | WriteOp::UpdateField { collection, .. }
            | WriteOp::CreateIfAbsent { collection, .. }
            | WriteOp::Delete { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::MergeWrite { id, .. }
            | WriteOp::UpdateField { id, .. }
            | WriteOp::CreateIfAbsent { id, .. }
            | WriteOp::Delete { id, .. } => id,
        }
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            WriteOp::MergeWrite { .. } => "write",
            WriteOp::UpdateField { .. } => "update",
            WriteOp::CreateIfAbsent { .. } => "create",
            WriteOp::Delete { .. } => "delete",
        };
        write!(f, "{} {}/{}", verb, self.collection(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The store was changed.
    Written,
    /// The write was valid but changed nothing (record already present or
    /// already gone).
    Unchanged,
    /// Nobody was signed in; nothing was submitted.
    Skipped,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("document '{id}' not found in {collection}")]
    DocumentNotFound { collection: Collection, id: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("write queue is closed")]
    QueueClosed,
}

impl From<StoreError> for WriteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DocumentNotFound { collection, id } => {
                WriteError::DocumentNotFound { collection, id }
            }
            other => WriteError::Store(other.to_string()),
        }
    }
}

/// A write that failed, as delivered to the failure sink.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    pub uid: UserId,
    pub op: WriteOp,
    pub error: WriteError,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} failed: {}", self.op, self.uid, self.error)
    }
}

type WriteResult = Result<WriteOutcome, WriteError>;

/// Result of a submitted write. Dropping the handle does not cancel the write.
#[derive(Debug)]
pub struct WriteHandle {
    rx: oneshot::Receiver<WriteResult>,
}

impl WriteHandle {
    fn resolved(result: WriteResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// A handle for an operation that was not submitted because nobody is
    /// signed in.
    pub fn skipped() -> Self {
        Self::resolved(Ok(WriteOutcome::Skipped))
    }

    pub async fn wait(self) -> WriteResult {
        self.rx.await.unwrap_or(Err(WriteError::QueueClosed))
    }
}

/// Awaits every handle, returning results in the same order.
pub async fn wait_all(handles: Vec<WriteHandle>) -> Vec<WriteResult> {
    join_all(handles.into_iter().map(WriteHandle::wait)).await
}

struct Job {
    uid: UserId,
    op: WriteOp,
    reply: oneshot::Sender<WriteResult>,
}

/// Sender side of the write worker. Clones share the same worker.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteQueue {
    /// Starts the worker task. Must be called from within a tokio runtime.
    ///
    /// The worker stops once every clone of the queue has been dropped and
    /// the pending writes are done.
    pub fn spawn(
        store: Arc<DocumentStore>,
        failures: Option<mpsc::UnboundedSender<WriteFailure>>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = apply(&store, &job.uid, &job.op).await;

                if let Err(error) = &result {
                    let failure = WriteFailure {
                        uid: job.uid,
                        op: job.op,
                        error: error.clone(),
                    };
                    tracing::warn!("{}", failure);
                    if let Some(sink) = &failures {
                        let _ = sink.send(failure);
                    }
                }

                let _ = job.reply.send(result);
            }
            tracing::debug!("Write queue closed");
        });

        Self { tx }
    }

    /// Queues `op` for `uid` and returns immediately.
    pub fn submit(&self, uid: UserId, op: WriteOp) -> WriteHandle {
        let (reply, rx) = oneshot::channel();
        let job = Job { uid, op, reply };

        match self.tx.send(job) {
            Ok(()) => WriteHandle { rx },
            Err(mpsc::error::SendError(job)) => {
                tracing::warn!("{} for {} dropped: write queue is closed", job.op, job.uid);
                WriteHandle::resolved(Err(WriteError::QueueClosed))
            }
        }
    }
}

async fn apply(store: &DocumentStore, uid: &UserId, op: &WriteOp) -> WriteResult {
    let changed = match op {
        WriteOp::MergeWrite {
            collection,
            id,
            payload,
        } => {
            store.merge_write(uid, *collection, id, payload).await?;
            true
        }
        WriteOp::UpdateField {
            collection,
            id,
            path,
            value,
        } => {
            store.update_field(uid, *collection, id, path, value).await?;
            true
        }
        WriteOp::CreateIfAbsent {
            collection,
            id,
            payload,
        } => store.create_if_absent(uid, *collection, id, payload).await?,
        WriteOp::Delete { collection, id } => store.delete(uid, *collection, id).await?,
    };

    Ok(if changed {
        WriteOutcome::Written
    } else {
        WriteOutcome::Unchanged
    })
}
