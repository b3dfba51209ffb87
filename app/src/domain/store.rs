//! Hunt Store: the local, ordered view of the signed-in user's hunts.
//!
//! The store is a `tokio::sync::watch` cell. The sync controller holds the
//! [`HuntStore`] and is the only writer; views hold a [`HuntListReader`] and
//! re-render whenever a new [`HuntList`] is published. The store performs no
//! validation.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Hunt, HuntId};

/// Immutable snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HuntList {
    items: Vec<Hunt>,
    loading: bool,
    revision: u64,
}

impl HuntList {
    /// Hunts ordered newest first.
    pub fn items(&self) -> &[Hunt] {
        &self.items
    }

    /// True between opening a subscription and its first snapshot.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of authoritative snapshots applied since the last clear.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a hunt by id.
    pub fn get(&self, id: &HuntId) -> Option<&Hunt> {
        self.items.iter().find(|hunt| hunt.id() == id)
    }

    /// Whether a hunt with `id` is present.
    pub fn contains(&self, id: &HuntId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Writable handle on the store.
#[derive(Debug, Clone)]
pub struct HuntStore {
    cell: Arc<watch::Sender<HuntList>>,
}

impl Default for HuntStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HuntStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (cell, _) = watch::channel(HuntList::default());
        Self {
            cell: Arc::new(cell),
        }
    }

    /// Read-only handle for views.
    pub fn reader(&self) -> HuntListReader {
        HuntListReader {
            receiver: self.cell.subscribe(),
        }
    }

    /// Clone of the current list.
    pub fn snapshot(&self) -> HuntList {
        self.cell.borrow().clone()
    }

    /// Clone of the hunt with `id`, if present.
    pub fn get(&self, id: &HuntId) -> Option<Hunt> {
        self.cell.borrow().get(id).cloned()
    }

    /// Replace the whole collection with an authoritative snapshot.
    ///
    /// Any optimistic entry is superseded; the snapshot decides membership,
    /// order, and field values.
    pub fn replace_all(&self, hunts: Vec<Hunt>) {
        self.cell.send_modify(|list| {
            list.items = hunts;
            list.loading = false;
            list.revision += 1;
        });
    }

    /// Insert an optimistic entry at the front.
    ///
    /// Returns `false` without touching the list when the id is already
    /// present, because a snapshot has already delivered the authoritative
    /// record.
    pub fn insert_front(&self, hunt: Hunt) -> bool {
        self.cell.send_if_modified(|list| {
            if list.contains(hunt.id()) {
                return false;
            }
            list.items.insert(0, hunt);
            true
        })
    }

    /// Replace the entry with a matching id. No-op when absent.
    pub fn update(&self, hunt: Hunt) -> bool {
        self.cell.send_if_modified(|list| {
            match list.items.iter_mut().find(|existing| existing.id() == hunt.id()) {
                Some(existing) => {
                    *existing = hunt;
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the entry with a matching id. No-op when absent.
    pub fn remove(&self, id: &HuntId) -> bool {
        self.cell.send_if_modified(|list| {
            let before = list.items.len();
            list.items.retain(|hunt| hunt.id() != id);
            list.items.len() != before
        })
    }

    /// Empty the store and reset its revision.
    pub fn clear(&self) {
        self.cell.send_replace(HuntList::default());
    }

    /// Flag the list as waiting for its first snapshot.
    pub fn mark_loading(&self) {
        self.cell.send_if_modified(|list| {
            if list.loading {
                return false;
            }
            list.loading = true;
            true
        });
    }
}

/// Read-only view of the store.
#[derive(Debug, Clone)]
pub struct HuntListReader {
    receiver: watch::Receiver<HuntList>,
}

impl HuntListReader {
    /// Clone of the latest published list.
    pub fn current(&self) -> HuntList {
        self.receiver.borrow().clone()
    }

    /// Wait until the store publishes a new list.
    ///
    /// Returns `false` once every writer handle has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Wait until `predicate` holds for the published list and return it.
    ///
    /// Returns `None` if every writer handle is dropped first.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&HuntList) -> bool) -> Option<HuntList> {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|list| list.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn hunt(id: &str, name: &str, minute: u32) -> Hunt {
        let created_at = Utc
            .with_ymd_and_hms(2025, 6, 1, 9, minute, 0)
            .single()
            .expect("valid timestamp");
        Hunt::try_from_parts(id, name, "u1", created_at).expect("valid hunt")
    }

    fn ids(list: &HuntList) -> Vec<&str> {
        list.items().iter().map(|h| h.id().as_ref()).collect()
    }

    #[fixture]
    fn store() -> HuntStore {
        HuntStore::new()
    }

    #[rstest]
    fn replace_all_supersedes_previous_contents(store: HuntStore) {
        store.replace_all(vec![hunt("a", "A", 1)]);
        store.replace_all(vec![hunt("c", "C", 3), hunt("b", "B", 2)]);

        let list = store.snapshot();
        assert_eq!(ids(&list), vec!["c", "b"]);
        assert_eq!(list.revision(), 2);
        assert!(!list.is_loading());
    }

    #[rstest]
    fn insert_front_then_snapshot_does_not_duplicate(store: HuntStore) {
        store.replace_all(vec![hunt("a", "A", 1)]);
        assert!(store.insert_front(hunt("b", "B", 59)));
        assert_eq!(ids(&store.snapshot()), vec!["b", "a"]);

        store.replace_all(vec![hunt("b", "B", 2), hunt("a", "A", 1)]);

        let list = store.snapshot();
        assert_eq!(ids(&list), vec!["b", "a"]);
        let authoritative = hunt("b", "B", 2);
        assert_eq!(list.get(authoritative.id()), Some(&authoritative));
    }

    #[rstest]
    fn insert_front_after_snapshot_is_a_no_op(store: HuntStore) {
        store.replace_all(vec![hunt("b", "B", 2)]);
        assert!(!store.insert_front(hunt("b", "B", 59)));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[rstest]
    fn update_replaces_matching_entry_only(store: HuntStore) {
        store.replace_all(vec![hunt("a", "A", 1)]);
        assert!(store.update(hunt("a", "A2", 1)));
        assert!(!store.update(hunt("z", "Z", 1)));

        let list = store.snapshot();
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].name().as_ref(), "A2");
    }

    #[rstest]
    fn remove_is_a_no_op_for_unknown_ids(store: HuntStore) {
        store.replace_all(vec![hunt("a", "A", 1)]);
        assert!(!store.remove(&HuntId::new("z").expect("id")));
        assert!(store.remove(&HuntId::new("a").expect("id")));
        assert!(store.snapshot().is_empty());
    }

    #[rstest]
    fn clear_resets_loading_and_revision(store: HuntStore) {
        store.mark_loading();
        assert!(store.snapshot().is_loading());
        store.replace_all(vec![hunt("a", "A", 1)]);
        store.clear();

        assert_eq!(store.snapshot(), HuntList::default());
    }

    #[rstest]
    #[tokio::test]
    async fn readers_observe_published_snapshots(store: HuntStore) {
        let mut reader = store.reader();
        let writer = store.clone();
        tokio::spawn(async move {
            writer.replace_all(vec![hunt("a", "A", 1)]);
        });

        let list = reader
            .wait_for(|list| list.revision() >= 1)
            .await
            .expect("store alive");
        assert_eq!(ids(&list), vec!["a"]);
    }
}
