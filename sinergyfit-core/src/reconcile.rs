//! Merging seed records with user-owned records.
//!
//! A user record shadows a seed record when it has exactly the seed's id or
//! links to it through `source_seed_id`. Ids are compared whole; they are
//! never split on `-`.

use std::collections::HashSet;

use crate::models::{Recipe, Routine};

/// A record that can take part in reconciliation.
pub trait Reconcilable {
    fn id(&self) -> &str;

    /// Id of the seed record this record was derived from, if any.
    fn source_seed_id(&self) -> Option<&str>;

    /// Seed ids this record hides: its own id and its seed link.
    fn shadowed_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id()).chain(self.source_seed_id())
    }
}

impl Reconcilable for Routine {
    fn id(&self) -> &str {
        &self.id
    }

    fn source_seed_id(&self) -> Option<&str> {
        self.source_seed_id.as_deref()
    }
}

impl Reconcilable for Recipe {
    fn id(&self) -> &str {
        &self.id
    }

    fn source_seed_id(&self) -> Option<&str> {
        self.source_seed_id.as_deref()
    }
}

/// Seed entries not shadowed by `user`, in seed order, followed by all of
/// `user` in its own order.
pub fn reconcile<T: Reconcilable + Clone>(seed: &[T], user: &[T]) -> Vec<T> {
    let shadowed: HashSet<&str> = user.iter().flat_map(|r| r.shadowed_ids()).collect();

    seed.iter()
        .filter(|r| !shadowed.contains(r.id()))
        .chain(user.iter())
        .cloned()
        .collect()
}
