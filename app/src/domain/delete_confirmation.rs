//! Confirmation gate for destructive deletes.

use tracing::debug;

use crate::domain::ports::HuntCollection;
use crate::domain::{Error, HuntAlert, HuntId, HuntSyncController, Navigation};

/// A delete that passed the session and ownership checks but has not been
/// sent yet.
///
/// Returned by [`HuntSyncController::request_delete`]. The remote delete is
/// issued only by [`DeleteConfirmation::confirm`].
#[must_use = "a delete request does nothing until it is confirmed"]
pub struct DeleteConfirmation<C> {
    controller: HuntSyncController<C>,
    id: HuntId,
    /// Subscription epoch the ownership check ran under.
    epoch: u64,
}

impl<C> DeleteConfirmation<C> {
    pub(crate) fn new(controller: HuntSyncController<C>, id: HuntId, epoch: u64) -> Self {
        Self {
            controller,
            id,
            epoch,
        }
    }

    /// Id of the hunt pending deletion.
    pub fn id(&self) -> &HuntId {
        &self.id
    }

    /// Prompt to show before asking for confirmation.
    pub fn prompt(&self) -> HuntAlert {
        HuntAlert::confirm_delete()
    }

    /// Abandon the delete.
    pub fn cancel(self) {
        debug!(hunt_id = %self.id, "delete cancelled");
    }
}

impl<C> DeleteConfirmation<C>
where
    C: HuntCollection + 'static,
{
    /// Issue the remote delete and route the caller back to the list.
    ///
    /// Fails as unauthorized if the session changed since the request was
    /// made.
    pub async fn confirm(self) -> Result<Navigation, Error> {
        self.controller.delete_confirmed(&self.id, self.epoch).await?;
        Ok(Navigation::ToHuntList)
    }
}

impl<C> std::fmt::Debug for DeleteConfirmation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteConfirmation")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
