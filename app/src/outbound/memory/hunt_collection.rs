//! In-memory "hunts" collection with live queries.
//!
//! Documents are stored in their raw shape, so a document written by another
//! client with a malformed name or owner can exist here just as it can in the
//! hosted database. Such documents are skipped, with a warning, when
//! snapshots are built.
//!
//! Every mutation republishes full snapshots to the live queries it affects.
//! Cancelled queries unregister themselves through the live-query teardown.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, warn};

use crate::domain::ports::{HuntCollection, HuntCollectionError, LiveQuery, LiveQueryFeed};
use crate::domain::{Hunt, HuntId, HuntName, NewHunt, UserId};

/// Length of generated document ids.
const DOCUMENT_ID_LEN: usize = 20;

/// Collection calls that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOperation {
    WatchOwned,
    WatchHunt,
    FindOwnedByName,
    Create,
    Rename,
    Delete,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    name: String,
    user_id: String,
    created_at: DateTime<Utc>,
    seq: u64,
}

impl StoredDocument {
    fn to_hunt(&self) -> Option<Hunt> {
        match Hunt::try_from_parts(&self.id, &self.name, &self.user_id, self.created_at) {
            Ok(hunt) => Some(hunt),
            Err(err) => {
                warn!(document_id = %self.id, error = %err, "skipping invalid hunt document");
                None
            }
        }
    }
}

enum Watcher {
    Owned {
        owner: UserId,
        feed: LiveQueryFeed<Vec<Hunt>>,
    },
    Document {
        id: HuntId,
        feed: LiveQueryFeed<Option<Hunt>>,
    },
}

#[derive(Default)]
struct CollectionState {
    documents: BTreeMap<String, StoredDocument>,
    next_seq: u64,
    next_watcher: u64,
    watchers: BTreeMap<u64, Watcher>,
    faults: Vec<(CollectionOperation, HuntCollectionError)>,
}

impl CollectionState {
    fn take_fault(&mut self, operation: CollectionOperation) -> Result<(), HuntCollectionError> {
        match self.faults.iter().position(|(op, _)| *op == operation) {
            Some(index) => Err(self.faults.remove(index).1),
            None => Ok(()),
        }
    }

    /// Owner's hunts, newest first. Ties on the timestamp keep the most
    /// recent write first.
    fn owned_snapshot(&self, owner: &UserId) -> Vec<Hunt> {
        let mut owned: Vec<&StoredDocument> = self
            .documents
            .values()
            .filter(|doc| doc.user_id == owner.as_ref())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        owned.into_iter().filter_map(StoredDocument::to_hunt).collect()
    }

    fn document_snapshot(&self, id: &HuntId) -> Option<Hunt> {
        self.documents
            .get(id.as_ref())
            .and_then(StoredDocument::to_hunt)
    }

    fn insert(&mut self, id: String, name: String, user_id: String, created_at: DateTime<Utc>) {
        self.next_seq += 1;
        let doc = StoredDocument {
            id: id.clone(),
            name,
            user_id,
            created_at,
            seq: self.next_seq,
        };
        self.documents.insert(id, doc);
    }

    fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(DOCUMENT_ID_LEN)
                .map(char::from)
                .collect();
            if !self.documents.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Republish snapshots to every query that can observe `changed`.
    fn notify(&mut self, owners: &[&str], changed: &str) {
        let mut closed = Vec::new();
        for (key, watcher) in &self.watchers {
            let delivered = match watcher {
                Watcher::Owned { owner, feed } if owners.contains(&owner.as_ref()) => {
                    feed.publish(Ok(self.owned_snapshot(owner)))
                }
                Watcher::Document { id, feed } if id.as_ref() == changed => {
                    feed.publish(Ok(self.document_snapshot(id)))
                }
                Watcher::Owned { feed, .. } => feed.is_active(),
                Watcher::Document { feed, .. } => feed.is_active(),
            };
            if !delivered {
                closed.push(*key);
            }
        }
        for key in closed {
            self.watchers.remove(&key);
        }
    }
}

/// In-memory stand-in for the hosted "hunts" collection.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use hunts::domain::UserId;
/// use hunts::outbound::memory::InMemoryHuntCollection;
/// use mockable::DefaultClock;
///
/// let collection = InMemoryHuntCollection::new(Arc::new(DefaultClock));
/// let owner = UserId::new("u1").expect("valid uid");
/// collection.seed(&owner, "Beach Hunt");
/// assert_eq!(collection.document_count(), 1);
/// ```
pub struct InMemoryHuntCollection {
    clock: Arc<dyn Clock + Send + Sync>,
    state: Arc<Mutex<CollectionState>>,
}

impl InMemoryHuntCollection {
    /// Create an empty collection stamping documents with `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(CollectionState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: CollectionOperation, error: HuntCollectionError) {
        self.lock().faults.push((operation, error));
    }

    /// Write a document as another client would, bypassing validation.
    pub fn insert_raw(&self, id: &str, name: &str, user_id: &str) {
        let now = self.clock.utc();
        let mut state = self.lock();
        state.insert(id.to_owned(), name.to_owned(), user_id.to_owned(), now);
        state.notify(&[user_id], id);
    }

    /// Create a valid document directly and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid hunt name.
    pub fn seed(&self, owner: &UserId, name: &str) -> HuntId {
        let name = match HuntName::new(name) {
            Ok(name) => name,
            Err(err) => panic!("seed names must be valid: {err}"),
        };
        let now = self.clock.utc();
        let mut state = self.lock();
        let id = state.generate_id();
        state.insert(id.clone(), name.into(), owner.as_ref().to_owned(), now);
        state.notify(&[owner.as_ref()], &id);
        HuntId::try_from(id).unwrap_or_else(|err| panic!("generated id is invalid: {err}"))
    }

    /// Number of stored documents, valid or not.
    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    /// Number of live queries that have not been cancelled.
    pub fn active_watchers(&self) -> usize {
        let mut state = self.lock();
        state.watchers.retain(|_, watcher| match watcher {
            Watcher::Owned { feed, .. } => feed.is_active(),
            Watcher::Document { feed, .. } => feed.is_active(),
        });
        state.watchers.len()
    }

    fn register<T>(
        &self,
        state: &mut CollectionState,
        query: LiveQuery<T>,
        watcher: Watcher,
    ) -> LiveQuery<T> {
        state.next_watcher += 1;
        let key = state.next_watcher;
        state.watchers.insert(key, watcher);
        let registry: Weak<Mutex<CollectionState>> = Arc::downgrade(&self.state);
        query.with_teardown(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .watchers
                    .remove(&key);
            }
        })
    }
}

#[async_trait]
impl HuntCollection for InMemoryHuntCollection {
    fn watch_owned(&self, owner: &UserId) -> Result<LiveQuery<Vec<Hunt>>, HuntCollectionError> {
        let mut state = self.lock();
        state.take_fault(CollectionOperation::WatchOwned)?;
        let (feed, query) = LiveQuery::channel();
        feed.publish(Ok(state.owned_snapshot(owner)));
        let watcher = Watcher::Owned {
            owner: owner.clone(),
            feed,
        };
        debug!(user_id = %owner, "owned-hunts query registered");
        Ok(self.register(&mut state, query, watcher))
    }

    fn watch_hunt(&self, id: &HuntId) -> Result<LiveQuery<Option<Hunt>>, HuntCollectionError> {
        let mut state = self.lock();
        state.take_fault(CollectionOperation::WatchHunt)?;
        let (feed, query) = LiveQuery::channel();
        feed.publish(Ok(state.document_snapshot(id)));
        let watcher = Watcher::Document {
            id: id.clone(),
            feed,
        };
        Ok(self.register(&mut state, query, watcher))
    }

    async fn find_owned_by_name(
        &self,
        owner: &UserId,
        name: &HuntName,
    ) -> Result<Vec<Hunt>, HuntCollectionError> {
        let mut state = self.lock();
        state.take_fault(CollectionOperation::FindOwnedByName)?;
        Ok(state
            .owned_snapshot(owner)
            .into_iter()
            .filter(|hunt| hunt.name() == name)
            .collect())
    }

    async fn create(&self, hunt: &NewHunt) -> Result<HuntId, HuntCollectionError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        state.take_fault(CollectionOperation::Create)?;
        let id = state.generate_id();
        state.insert(
            id.clone(),
            hunt.name.as_ref().to_owned(),
            hunt.user_id.as_ref().to_owned(),
            now,
        );
        state.notify(&[hunt.user_id.as_ref()], &id);
        HuntId::try_from(id).map_err(|err| HuntCollectionError::query(err.to_string()))
    }

    async fn rename(&self, id: &HuntId, name: &HuntName) -> Result<(), HuntCollectionError> {
        let mut state = self.lock();
        state.take_fault(CollectionOperation::Rename)?;
        let doc = state
            .documents
            .get_mut(id.as_ref())
            .ok_or_else(|| HuntCollectionError::query(format!("no document to update: {id}")))?;
        doc.name = name.as_ref().to_owned();
        let owner = doc.user_id.clone();
        state.notify(&[owner.as_str()], id.as_ref());
        Ok(())
    }

    async fn delete(&self, id: &HuntId) -> Result<(), HuntCollectionError> {
        let mut state = self.lock();
        state.take_fault(CollectionOperation::Delete)?;
        if let Some(doc) = state.documents.remove(id.as_ref()) {
            state.notify(&[doc.user_id.as_str()], id.as_ref());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "hunt_collection_tests.rs"]
mod tests;
