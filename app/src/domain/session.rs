//! Session state published to the sync controller.

use crate::domain::UserId;

/// Authentication state as observed by the rest of the app.
///
/// Only [`SessionState::SignedIn`] counts as an active session. A loading or
/// signed-out state leaves the controller unsubscribed with an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The provider has not reported an identity yet.
    #[default]
    Loading,
    /// No user is signed in.
    SignedOut,
    /// A user is signed in with this uid.
    SignedIn(UserId),
}

impl SessionState {
    /// The acting identity, if a session is active.
    ///
    /// # Examples
    /// ```
    /// use hunts::domain::{SessionState, UserId};
    ///
    /// let uid = UserId::new("u1").expect("valid uid");
    /// assert_eq!(SessionState::SignedIn(uid.clone()).identity(), Some(&uid));
    /// assert!(SessionState::Loading.identity().is_none());
    /// ```
    pub fn identity(&self) -> Option<&UserId> {
        match self {
            Self::SignedIn(uid) => Some(uid),
            Self::Loading | Self::SignedOut => None,
        }
    }

    /// Whether the provider is still resolving the identity.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl From<Option<UserId>> for SessionState {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Self::SignedOut, Self::SignedIn)
    }
}
