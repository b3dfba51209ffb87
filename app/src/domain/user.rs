//! Owner identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length the authentication provider uses for account ids.
pub const USER_ID_MAX: usize = 128;

/// Reasons a provider `uid` is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    /// Whitespace anywhere, or longer than [`USER_ID_MAX`].
    #[error("user id must be at most {USER_ID_MAX} characters without whitespace")]
    InvalidId,
}

/// Stable owner key issued by the authentication provider (`uid`).
///
/// Opaque to the domain: compared for equality, never parsed.
///
/// # Examples
/// ```
/// use hunts::domain::UserId;
///
/// let id = UserId::new("u1").expect("valid uid");
/// assert_eq!(id.as_ref(), "u1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        match id.as_str() {
            "" => Err(UserValidationError::EmptyId),
            raw if raw.chars().count() > USER_ID_MAX || raw.contains(char::is_whitespace) => {
                Err(UserValidationError::InvalidId)
            }
            _ => Ok(Self(id)),
        }
    }

    /// Owned identifier, consuming the wrapper.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.into_inner()
    }
}
