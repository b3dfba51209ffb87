//! Navigation requests returned to the views.

use crate::domain::HuntId;

/// Where the host should route the user after an intent completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Open the detail screen for a hunt.
    ToHunt(HuntId),
    /// Return to the hunt list.
    ToHuntList,
}
