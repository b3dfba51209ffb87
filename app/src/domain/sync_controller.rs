//! Hunt Sync Controller.
//!
//! Bridges user intents and the remote collection. While a session is
//! active the controller keeps exactly one live query open over the
//! signed-in user's hunts and applies every snapshot to the [`HuntStore`].
//! Writes are validated here before any remote call.
//!
//! Each subscription is tagged with an epoch. Session changes and
//! [`HuntSyncController::dispose`] bump the epoch under the state lock, and
//! every store mutation re-checks it under the same lock, so a snapshot or a
//! create result that belongs to an older session is discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{HuntCollection, HuntCollectionError, LiveQuery};
use crate::domain::{
    DeleteConfirmation, Error, Hunt, HuntDetailWatch, HuntId, HuntIntent, HuntListReader,
    HuntName, HuntNameRejectionReason, HuntStore, NewHunt, SessionState, TraceId, UserId,
};

/// Subscription lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No session, no live query.
    Unsubscribed,
    /// Live query open, first snapshot not applied yet.
    Subscribing,
    /// At least one snapshot applied.
    Live,
}

#[derive(Debug)]
struct SyncState {
    epoch: u64,
    identity: Option<UserId>,
    phase: SyncPhase,
    listener: Option<JoinHandle<()>>,
    disposed: bool,
}

impl SyncState {
    fn new() -> Self {
        Self {
            epoch: 0,
            identity: None,
            phase: SyncPhase::Unsubscribed,
            listener: None,
            disposed: false,
        }
    }

    /// Close the current subscription and forget the identity.
    fn teardown(&mut self, store: &HuntStore) {
        self.epoch += 1;
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.identity = None;
        self.phase = SyncPhase::Unsubscribed;
        store.clear();
    }
}

/// Controller that owns the store and the live subscription.
pub struct HuntSyncController<C> {
    collection: Arc<C>,
    clock: Arc<dyn Clock + Send + Sync>,
    store: HuntStore,
    state: Arc<Mutex<SyncState>>,
}

impl<C> Clone for HuntSyncController<C> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            clock: Arc::clone(&self.clock),
            store: self.store.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<C> HuntSyncController<C> {
    /// Create an unsubscribed controller with an empty store.
    pub fn new(collection: Arc<C>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            collection,
            clock,
            store: HuntStore::new(),
            state: Arc::new(Mutex::new(SyncState::new())),
        }
    }

    /// Read-only view of the store for list screens.
    pub fn hunts(&self) -> HuntListReader {
        self.store.reader()
    }

    /// Current subscription phase.
    pub fn sync_phase(&self) -> SyncPhase {
        self.lock_state().phase
    }

    /// Identity the controller is acting for.
    pub fn identity(&self) -> Option<UserId> {
        self.lock_state().identity.clone()
    }

    /// Whether [`Self::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.lock_state().disposed
    }

    /// Stop the subscription and clear the store.
    ///
    /// Synchronous and idempotent. Once this returns no snapshot or write
    /// result can reach the store, and later session changes are ignored.
    pub fn dispose(&self) {
        let mut state = self.lock_state();
        if state.disposed {
            return;
        }
        state.teardown(&self.store);
        state.disposed = true;
        debug!("hunt sync controller disposed");
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity and epoch for a write, or the intent's authorization error.
    fn acting_identity(&self, intent: HuntIntent) -> Result<(UserId, u64), Error> {
        let state = self.lock_state();
        match (&state.identity, state.disposed) {
            (Some(identity), false) => Ok((identity.clone(), state.epoch)),
            _ => Err(intent.unauthorized()),
        }
    }

    fn validate_name(raw: &str, intent: HuntIntent) -> Result<HuntName, Error> {
        HuntName::new(raw).map_err(|err| {
            HuntNameRejectionReason::from_validation_error(&err)
                .map(|reason| reason.into_error(intent))
                .unwrap_or_else(|| Error::invalid_request(err.to_string()))
        })
    }

    fn remote_failure(intent: HuntIntent, err: &HuntCollectionError) -> Error {
        error!(intent = intent.verb(), error = %err, "hunt collection call failed");
        intent.remote_failure()
    }

    /// Known hunt owned by `owner`, or the matching not-found or forbidden
    /// error.
    fn owned_hunt(&self, id: &HuntId, owner: &UserId, intent: HuntIntent) -> Result<Hunt, Error> {
        let hunt = self.store.get(id).ok_or_else(|| intent.not_found())?;
        if !hunt.is_owned_by(owner) {
            warn!(hunt_id = %id, intent = intent.verb(), "intent rejected for non-owner");
            return Err(intent.forbidden());
        }
        Ok(hunt)
    }
}

impl<C> HuntSyncController<C>
where
    C: HuntCollection + 'static,
{
    /// Apply a session state.
    ///
    /// A new identity tears down any previous subscription, clears the store,
    /// and opens a live query for that identity. A loading or signed-out
    /// state leaves the controller unsubscribed. Must be called from within a
    /// Tokio runtime because the snapshot listener is spawned onto it.
    pub fn set_session(&self, session: &SessionState) -> Result<(), Error> {
        let mut state = self.lock_state();
        if state.disposed {
            return Ok(());
        }
        let next = session.identity();
        if next.is_some() && next == state.identity.as_ref() {
            return Ok(());
        }
        if state.phase != SyncPhase::Unsubscribed {
            debug!("closing hunt subscription for previous session");
        }
        state.teardown(&self.store);

        let Some(owner) = next.cloned() else {
            return Ok(());
        };
        let query = match self.collection.watch_owned(&owner) {
            Ok(query) => query,
            Err(err) => {
                error!(user_id = %owner, error = %err, "could not open hunt subscription");
                return Err(Error::service_unavailable("Could not load hunts."));
            }
        };

        self.store.mark_loading();
        state.identity = Some(owner.clone());
        state.phase = SyncPhase::Subscribing;
        let listener = SnapshotListener {
            state: Arc::clone(&self.state),
            store: self.store.clone(),
            epoch: state.epoch,
        };
        state.listener = Some(tokio::spawn(listener.run(query)));
        debug!(user_id = %owner, "hunt subscription opened");
        Ok(())
    }

    /// Apply every session state published on `sessions` until the channel
    /// closes or the controller is disposed.
    ///
    /// The current value is applied immediately.
    pub fn follow_sessions(&self, mut sessions: watch::Receiver<SessionState>) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                let session = sessions.borrow_and_update().clone();
                if controller.is_disposed() {
                    break;
                }
                if let Err(err) = controller.set_session(&session) {
                    warn!(error = %err, "session change left the controller unsubscribed");
                }
                if sessions.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Create a hunt named `raw_name` for the signed-in user.
    ///
    /// On success the hunt is inserted at the front of the store with a
    /// provisional timestamp and its id is returned for navigation. The next
    /// snapshot replaces the provisional entry.
    pub async fn create(&self, raw_name: &str) -> Result<HuntId, Error> {
        TraceId::fresh_scope(self.create_in_scope(raw_name)).await
    }

    async fn create_in_scope(&self, raw_name: &str) -> Result<HuntId, Error> {
        let intent = HuntIntent::Create;
        let (owner, epoch) = self.acting_identity(intent)?;
        let name = Self::validate_name(raw_name, intent)?;

        let existing = self
            .collection
            .find_owned_by_name(&owner, &name)
            .await
            .map_err(|err| Self::remote_failure(intent, &err))?;
        if !existing.is_empty() {
            debug!(user_id = %owner, "duplicate hunt name rejected");
            return Err(HuntNameRejectionReason::Duplicate.into_error(intent));
        }

        let new_hunt = NewHunt {
            name: name.clone(),
            user_id: owner.clone(),
        };
        let id = self
            .collection
            .create(&new_hunt)
            .await
            .map_err(|err| Self::remote_failure(intent, &err))?;
        info!(hunt_id = %id, user_id = %owner, "hunt created");

        let provisional = Hunt::new(id.clone(), name, owner, self.clock.utc());
        let state = self.lock_state();
        if state.epoch == epoch {
            self.store.insert_front(provisional);
        } else {
            debug!(hunt_id = %id, "session changed during create; result not applied");
        }
        Ok(id)
    }

    /// Rename a hunt the signed-in user owns.
    ///
    /// The store is not updated here; the rename arrives with the next
    /// snapshot.
    pub async fn rename(&self, id: &HuntId, raw_name: &str) -> Result<(), Error> {
        TraceId::fresh_scope(self.rename_in_scope(id, raw_name)).await
    }

    async fn rename_in_scope(&self, id: &HuntId, raw_name: &str) -> Result<(), Error> {
        let intent = HuntIntent::Rename;
        let (owner, _) = self.acting_identity(intent)?;
        self.owned_hunt(id, &owner, intent)?;
        let name = Self::validate_name(raw_name, intent)?;

        self.collection
            .rename(id, &name)
            .await
            .map_err(|err| Self::remote_failure(intent, &err))?;
        info!(hunt_id = %id, "hunt renamed");
        Ok(())
    }

    /// Check that a delete is allowed and return the confirmation gate.
    ///
    /// Nothing is written until [`DeleteConfirmation::confirm`] runs.
    pub fn request_delete(&self, id: &HuntId) -> Result<DeleteConfirmation<C>, Error> {
        let intent = HuntIntent::Delete;
        let (owner, epoch) = self.acting_identity(intent)?;
        self.owned_hunt(id, &owner, intent)?;
        Ok(DeleteConfirmation::new(self.clone(), id.clone(), epoch))
    }

    /// Issue the remote delete for a confirmed request.
    ///
    /// The request is bound to the session it was made in. If that session
    /// has ended the delete fails as unauthorized, and ownership is checked
    /// again against the current store.
    pub(crate) async fn delete_confirmed(&self, id: &HuntId, epoch: u64) -> Result<(), Error> {
        TraceId::fresh_scope(async {
            let intent = HuntIntent::Delete;
            let (owner, current) = self.acting_identity(intent)?;
            if current != epoch {
                warn!(hunt_id = %id, "delete confirmed after the session changed");
                return Err(intent.unauthorized());
            }
            self.owned_hunt(id, &owner, intent)?;
            self.collection
                .delete(id)
                .await
                .map_err(|err| Self::remote_failure(intent, &err))?;
            info!(hunt_id = %id, "hunt deleted");
            Ok(())
        })
        .await
    }

    /// Open a live watch on one hunt for a detail screen.
    pub fn open_detail(&self, id: &HuntId) -> Result<HuntDetailWatch, Error> {
        let query = self.collection.watch_hunt(id).map_err(|err| {
            error!(hunt_id = %id, error = %err, "could not open hunt detail watch");
            Error::service_unavailable("Could not load hunt.")
        })?;
        Ok(HuntDetailWatch::new(id.clone(), query))
    }
}

/// Task that applies snapshots from one subscription to the store.
struct SnapshotListener {
    state: Arc<Mutex<SyncState>>,
    store: HuntStore,
    epoch: u64,
}

impl SnapshotListener {
    async fn run(self, mut query: LiveQuery<Vec<Hunt>>) {
        while let Some(event) = query.next().await {
            match event {
                Ok(hunts) => {
                    if !self.apply(hunts) {
                        query.cancel();
                        return;
                    }
                }
                Err(err) => warn!(error = %err, "hunt subscription reported an error"),
            }
        }
        debug!(epoch = self.epoch, "hunt subscription closed by remote");
    }

    /// Apply a snapshot unless the subscription is stale. Returns whether the
    /// subscription is still current.
    fn apply(&self, hunts: Vec<Hunt>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.epoch != self.epoch {
            return false;
        }
        debug!(count = hunts.len(), "applying hunt snapshot");
        self.store.replace_all(hunts);
        state.phase = SyncPhase::Live;
        true
    }
}

#[cfg(test)]
#[path = "sync_controller_tests.rs"]
mod tests;
