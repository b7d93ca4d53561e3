//! Live change notifications for user collections.

use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

use crate::automerge::Collection;
use crate::session::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Upserted,
    Deleted,
}

/// One record changed in a user collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub uid: UserId,
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
}

/// Fans change events out to subscribers of a user collection.
pub struct ChangeHub {
    /// Key: (user, collection)
    channels: RwLock<HashMap<(UserId, Collection), broadcast::Sender<ChangeEvent>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes to changes of one user collection.
    pub async fn subscribe(
        &self,
        uid: &UserId,
        collection: Collection,
    ) -> broadcast::Receiver<ChangeEvent> {
        let key = (uid.clone(), collection);

        let mut channels = self.channels.write().await;

        if let Some(sender) = channels.get(&key) {
            sender.subscribe()
        } else {
            let (sender, receiver) = broadcast::channel(16);
            channels.insert(key, sender);
            receiver
        }
    }

    /// Sends an event to everyone subscribed to its collection.
    ///
    /// A channel whose receivers are all gone is dropped.
    pub async fn publish(&self, event: ChangeEvent) {
        let key = (event.uid.clone(), event.collection);

        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&key) {
                Some(sender) => sender.send(event).is_ok(),
                None => return,
            }
        };

        if !delivered {
            let mut channels = self.channels.write().await;
            // A subscriber may have joined since the read lock was released
            if channels.get(&key).is_some_and(|s| s.receiver_count() == 0) {
                channels.remove(&key);
            }
        }
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}
