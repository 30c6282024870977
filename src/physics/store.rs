//! Owning droplet container keyed by stable identifiers.
//!
//! Identifiers increase monotonically and are never reused within a process
//! lifetime, so a stale id held across a kill can only miss, never alias a
//! different droplet. Algorithms that mutate the store while walking it must
//! snapshot [`DropletStore::ids`] first; the snapshot is sorted so iteration
//! order is deterministic wherever it matters to an assertion.

use super::droplet::Droplet;
use std::collections::HashMap;

/// Unique identifier for a droplet in the store.
pub type DropletId = u32;

/// Owning map from droplet id to droplet.
#[derive(Debug, Default)]
pub struct DropletStore {
    droplets: HashMap<DropletId, Droplet>,
    next_id: DropletId,
}

impl DropletStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a droplet, assigning it the next identifier.
    pub fn spawn(&mut self, droplet: Droplet) -> DropletId {
        let id = self.next_id;
        self.next_id += 1;
        self.droplets.insert(id, droplet);
        id
    }

    /// Remove and destroy a droplet.
    ///
    /// Killing an absent id is non-fatal; callers routinely race a kill
    /// against a removal earlier in the same tick. Returns whether the
    /// droplet was found.
    pub fn kill(&mut self, id: DropletId) -> bool {
        if self.droplets.remove(&id).is_none() {
            log::warn!("droplet id {} is not found", id);
            return false;
        }
        true
    }

    /// Get a reference to a droplet by id.
    pub fn get(&self, id: DropletId) -> Option<&Droplet> {
        self.droplets.get(&id)
    }

    /// Get a mutable reference to a droplet by id.
    pub fn get_mut(&mut self, id: DropletId) -> Option<&mut Droplet> {
        self.droplets.get_mut(&id)
    }

    /// Whether the store contains the id.
    pub fn contains(&self, id: DropletId) -> bool {
        self.droplets.contains_key(&id)
    }

    /// Snapshot of all ids, sorted ascending.
    pub fn ids(&self) -> Vec<DropletId> {
        let mut ids: Vec<DropletId> = self.droplets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Read-only iteration over all droplets, in no guaranteed order.
    pub fn iter(&self) -> impl Iterator<Item = (DropletId, &Droplet)> {
        self.droplets.iter().map(|(id, droplet)| (*id, droplet))
    }

    /// Mutable iteration over all droplets, in no guaranteed order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DropletId, &mut Droplet)> {
        self.droplets.iter_mut().map(|(id, droplet)| (*id, droplet))
    }

    /// Number of droplets in the store.
    pub fn len(&self) -> usize {
        self.droplets.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.droplets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn droplet() -> Droplet {
        Droplet::new(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, 1.0, 0.0)
    }

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut store = DropletStore::new();
        let a = store.spawn(droplet());
        let b = store.spawn(droplet());
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = DropletStore::new();
        let a = store.spawn(droplet());
        store.kill(a);
        let b = store.spawn(droplet());
        assert_ne!(a, b);
    }

    #[test]
    fn test_double_kill_is_safe() {
        let mut store = DropletStore::new();
        let a = store.spawn(droplet());
        let b = store.spawn(droplet());

        assert!(store.kill(a));
        assert!(!store.kill(a)); // second kill reports not-found
        assert!(store.contains(b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup() {
        let mut store = DropletStore::new();
        let a = store.spawn(droplet());
        assert!(store.get(a).is_some());
        assert!(store.get(a + 1).is_none());

        if let Some(found) = store.get_mut(a) {
            found.radius = 4.0;
        }
        assert_eq!(store.get(a).map(|d| d.radius), Some(4.0));
    }

    #[test]
    fn test_ids_snapshot_sorted() {
        let mut store = DropletStore::new();
        for _ in 0..16 {
            store.spawn(droplet());
        }
        let ids = store.ids();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
