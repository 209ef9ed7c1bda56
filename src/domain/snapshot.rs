//! Cached snapshot container: app-owned, SDK-provided update logic.
//!
//! A [`CachedSnapshot`] is the locally held copy of one entity kind for the
//! active subaccount. Live stream updates are merged with [`CachedSnapshot::upsert`];
//! reconciliation swaps the whole sequence with [`CachedSnapshot::replace`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::hash::Hash;
use std::sync::Arc;

/// An entity that can live in a [`CachedSnapshot`].
pub trait SnapshotEntity: Clone + Send + Sync + 'static {
    /// Identity used to merge stream updates into the snapshot.
    type Key: Eq + Hash + Clone + std::fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Entities in a terminal state (closed position, filled order) are
    /// dropped from the snapshot instead of being stored.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// A snapshot shared between the store owner, stream callbacks and strategies.
pub type SharedSnapshot<T> = Arc<RwLock<CachedSnapshot<T>>>;

/// Ordered sequence of cached entity records.
#[derive(Debug, Clone)]
pub struct CachedSnapshot<T> {
    entries: Vec<T>,
    generation: u64,
    replaced_at: Option<DateTime<Utc>>,
    diverged: bool,
}

impl<T> Default for CachedSnapshot<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generation: 0,
            replaced_at: None,
            diverged: false,
        }
    }
}

impl<T: SnapshotEntity> CachedSnapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh, empty snapshot for sharing.
    pub fn shared() -> SharedSnapshot<T> {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Incremented on every [`replace`](Self::replace) and [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replaced_at(&self) -> Option<DateTime<Utc>> {
        self.replaced_at
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.entries.iter().find(|e| &e.key() == key)
    }

    /// Replace the whole sequence. Clears any recorded divergence.
    pub fn replace(&mut self, entries: Vec<T>) {
        self.entries = entries;
        self.generation += 1;
        self.replaced_at = Some(Utc::now());
        self.diverged = false;
    }

    /// Insert or update an entity by key, keeping its position in the
    /// sequence. Terminal entities are removed.
    pub fn upsert(&mut self, entity: T) {
        let key = entity.key();
        let existing = self.entries.iter().position(|e| e.key() == key);

        match (existing, entity.is_terminal()) {
            (Some(idx), true) => {
                self.entries.remove(idx);
            }
            (Some(idx), false) => self.entries[idx] = entity,
            (None, true) => {}
            (None, false) => self.entries.push(entity),
        }
    }

    /// Remove an entity by key. Returns the removed entity, if any.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let idx = self.entries.iter().position(|e| &e.key() == key)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
        self.replaced_at = None;
        self.diverged = false;
    }

    /// Record that the cached data no longer matches the backend.
    pub fn mark_diverged(&mut self) {
        self.diverged = true;
    }

    /// A snapshot is valid until a divergence is recorded; replacing it
    /// makes it valid again.
    pub fn is_valid(&self) -> bool {
        !self.diverged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        value: u32,
        closed: bool,
    }

    impl SnapshotEntity for Item {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn is_terminal(&self) -> bool {
            self.closed
        }
    }

    fn item(id: u32, value: u32) -> Item {
        Item {
            id,
            value,
            closed: false,
        }
    }

    #[test]
    fn test_upsert_appends_and_updates_in_place() {
        let mut snap = CachedSnapshot::new();
        snap.upsert(item(1, 10));
        snap.upsert(item(2, 20));
        snap.upsert(item(1, 11));
        assert_eq!(snap.entries(), &[item(1, 11), item(2, 20)]);
    }

    #[test]
    fn test_upsert_terminal_removes() {
        let mut snap = CachedSnapshot::new();
        snap.upsert(item(1, 10));
        snap.upsert(Item {
            id: 1,
            value: 0,
            closed: true,
        });
        assert!(snap.is_empty());

        // Unknown terminal entity is ignored.
        snap.upsert(Item {
            id: 9,
            value: 0,
            closed: true,
        });
        assert!(snap.is_empty());
    }

    #[test]
    fn test_replace_bumps_generation_and_clears_divergence() {
        let mut snap = CachedSnapshot::new();
        snap.upsert(item(1, 10));
        snap.mark_diverged();
        assert!(!snap.is_valid());

        snap.replace(vec![item(3, 30)]);
        assert!(snap.is_valid());
        assert_eq!(snap.generation(), 1);
        assert!(snap.replaced_at().is_some());
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get(&3), Some(&item(3, 30)));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut snap = CachedSnapshot::new();
        snap.replace(vec![item(1, 10), item(2, 20)]);
        assert_eq!(snap.remove(&1), Some(item(1, 10)));
        assert_eq!(snap.remove(&1), None);
        snap.clear();
        assert!(snap.is_empty());
        assert_eq!(snap.generation(), 2);
        assert!(snap.replaced_at().is_none());
    }
}
