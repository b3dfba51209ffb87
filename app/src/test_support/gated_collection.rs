//! Collection wrapper that parks writes until a test releases them.

use async_trait::async_trait;
use tokio::sync::{Semaphore, watch};

use crate::domain::ports::{HuntCollection, HuntCollectionError, LiveQuery};
use crate::domain::{Hunt, HuntId, HuntName, NewHunt, UserId};

/// Delegates to `inner`, except that `create` waits for [`Self::release`].
///
/// Lets a test dispose the controller, switch sessions, or start a second
/// create while a create is in flight. Releases are counted, so a release
/// issued before a create reaches the gate is not lost.
pub struct GatedHuntCollection<C> {
    inner: C,
    arrived: watch::Sender<usize>,
    gate: Semaphore,
}

impl<C> GatedHuntCollection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            arrived: watch::Sender::new(0),
            gate: Semaphore::new(0),
        }
    }

    /// The wrapped collection.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Wait until a create call has reached the gate.
    pub async fn wait_for_create(&self) {
        self.wait_for_creates(1).await;
    }

    /// Wait until `count` create calls in total have reached the gate.
    pub async fn wait_for_creates(&self, count: usize) {
        let mut arrived = self.arrived.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = arrived.wait_for(|seen| *seen >= count).await;
    }

    /// Let one parked create proceed.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl<C> HuntCollection for GatedHuntCollection<C>
where
    C: HuntCollection,
{
    fn watch_owned(&self, owner: &UserId) -> Result<LiveQuery<Vec<Hunt>>, HuntCollectionError> {
        self.inner.watch_owned(owner)
    }

    fn watch_hunt(&self, id: &HuntId) -> Result<LiveQuery<Option<Hunt>>, HuntCollectionError> {
        self.inner.watch_hunt(id)
    }

    async fn find_owned_by_name(
        &self,
        owner: &UserId,
        name: &HuntName,
    ) -> Result<Vec<Hunt>, HuntCollectionError> {
        self.inner.find_owned_by_name(owner, name).await
    }

    async fn create(&self, hunt: &NewHunt) -> Result<HuntId, HuntCollectionError> {
        self.arrived.send_modify(|seen| *seen += 1);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.create(hunt).await
    }

    async fn rename(&self, id: &HuntId, name: &HuntName) -> Result<(), HuntCollectionError> {
        self.inner.rename(id, name).await
    }

    async fn delete(&self, id: &HuntId) -> Result<(), HuntCollectionError> {
        self.inner.delete(id).await
    }
}
