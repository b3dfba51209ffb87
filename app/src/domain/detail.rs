//! Live watch over the hunt shown on a detail screen.
//!
//! The detail screen follows one document. When the document disappears,
//! because it was deleted here or from another device, the watch reports
//! [`DetailUpdate::Removed`] once and then ends, so the screen exits instead
//! of rendering a stale record.

use tracing::warn;

use crate::domain::ports::LiveQuery;
use crate::domain::{Hunt, HuntId, Navigation};

/// Event delivered to a detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailUpdate {
    /// The latest version of the hunt.
    Loaded(Hunt),
    /// The hunt no longer exists.
    Removed,
}

impl DetailUpdate {
    /// Navigation the screen must perform, if any.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::Loaded(_) => None,
            Self::Removed => Some(Navigation::ToHuntList),
        }
    }
}

/// Subscription handle owned by a detail screen.
#[derive(Debug)]
pub struct HuntDetailWatch {
    id: HuntId,
    query: LiveQuery<Option<Hunt>>,
    ended: bool,
}

impl HuntDetailWatch {
    pub(crate) fn new(id: HuntId, query: LiveQuery<Option<Hunt>>) -> Self {
        Self {
            id,
            query,
            ended: false,
        }
    }

    /// Id of the watched hunt.
    pub fn id(&self) -> &HuntId {
        &self.id
    }

    /// Wait for the next update.
    ///
    /// Returns `None` after [`DetailUpdate::Removed`] has been delivered, after
    /// [`Self::close`], or when the remote side closes the subscription.
    pub async fn next(&mut self) -> Option<DetailUpdate> {
        if self.ended {
            return None;
        }
        while let Some(event) = self.query.next().await {
            match event {
                Ok(Some(hunt)) => return Some(DetailUpdate::Loaded(hunt)),
                Ok(None) => {
                    self.close();
                    return Some(DetailUpdate::Removed);
                }
                Err(err) => warn!(hunt_id = %self.id, error = %err, "hunt detail query error"),
            }
        }
        self.ended = true;
        None
    }

    /// Stop watching. Safe to call more than once.
    pub fn close(&mut self) {
        self.ended = true;
        self.query.cancel();
    }
}
