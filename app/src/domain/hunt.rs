//! Hunt data model.
//!
//! A hunt is a named collection owned by exactly one user. Names are trimmed
//! before validation and compared case-sensitively; uniqueness per owner is
//! enforced by the sync controller, not by this type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Maximum length of a trimmed hunt name, counted in characters.
pub const HUNT_NAME_MAX: usize = 255;

/// Validation errors returned by the hunt constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntValidationError {
    /// The document id was empty.
    EmptyId,
    /// The document id contained a path separator or whitespace.
    InvalidId,
    /// The name was empty once trimmed.
    EmptyName,
    /// The trimmed name exceeded the allowed length.
    NameTooLong {
        /// Inclusive upper bound.
        max: usize,
    },
    /// The owner id failed validation.
    InvalidOwner,
}

impl fmt::Display for HuntValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "hunt id must not be empty"),
            Self::InvalidId => write!(f, "hunt id must not contain '/' or whitespace"),
            Self::EmptyName => write!(f, "hunt name must not be empty"),
            Self::NameTooLong { max } => write!(f, "hunt name must be at most {max} characters"),
            Self::InvalidOwner => write!(f, "hunt owner id is invalid"),
        }
    }
}

impl std::error::Error for HuntValidationError {}

/// Server-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HuntId(String);

impl HuntId {
    /// Validate and construct a [`HuntId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, HuntValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, HuntValidationError> {
        if id.is_empty() {
            return Err(HuntValidationError::EmptyId);
        }
        if id.contains('/') || id.chars().any(char::is_whitespace) {
            return Err(HuntValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for HuntId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HuntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<HuntId> for String {
    fn from(value: HuntId) -> Self {
        value.0
    }
}

impl TryFrom<String> for HuntId {
    type Error = HuntValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Trimmed, length-checked hunt name.
///
/// # Examples
/// ```
/// use hunts::domain::HuntName;
///
/// let name = HuntName::new("  Beach Hunt ").expect("valid name");
/// assert_eq!(name.as_ref(), "Beach Hunt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HuntName(String);

impl HuntName {
    /// Trim and validate raw user input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, HuntValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HuntValidationError::EmptyName);
        }
        if trimmed.chars().count() > HUNT_NAME_MAX {
            return Err(HuntValidationError::NameTooLong { max: HUNT_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for HuntName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HuntName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<HuntName> for String {
    fn from(value: HuntName) -> Self {
        value.0
    }
}

impl TryFrom<String> for HuntName {
    type Error = HuntValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Hunt record as held by the store.
///
/// ## Invariants
/// - `id`, `user_id`, and `created_at` never change after creation.
/// - `name` is trimmed and between 1 and [`HUNT_NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HuntDto", into = "HuntDto")]
pub struct Hunt {
    id: HuntId,
    name: HuntName,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl Hunt {
    /// Build a hunt from validated components.
    pub fn new(id: HuntId, name: HuntName, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            user_id,
            created_at,
        }
    }

    /// Fallible constructor for raw document fields.
    pub fn try_from_parts(
        id: impl AsRef<str>,
        name: impl AsRef<str>,
        user_id: impl AsRef<str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, HuntValidationError> {
        let id = HuntId::new(id)?;
        let name = HuntName::new(name)?;
        let user_id =
            UserId::new(user_id.as_ref()).map_err(|_| HuntValidationError::InvalidOwner)?;
        Ok(Self::new(id, name, user_id, created_at))
    }

    /// Server-assigned identifier.
    pub fn id(&self) -> &HuntId {
        &self.id
    }

    /// Current display name.
    pub fn name(&self) -> &HuntName {
        &self.name
    }

    /// Owning identity.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Creation timestamp; provisional for optimistic entries.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `owner` owns this hunt.
    pub fn is_owned_by(&self, owner: &UserId) -> bool {
        &self.user_id == owner
    }
}

/// Fields written when a hunt is created.
///
/// The creation timestamp is deliberately absent: the remote service assigns
/// it so that ordering stays consistent across clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHunt {
    /// Validated, trimmed name.
    pub name: HuntName,
    /// Owner recorded on the document.
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HuntDto {
    id: String,
    name: String,
    #[serde(alias = "user_id")]
    user_id: String,
    #[serde(alias = "created_at")]
    created_at: DateTime<Utc>,
}

impl From<Hunt> for HuntDto {
    fn from(value: Hunt) -> Self {
        let Hunt {
            id,
            name,
            user_id,
            created_at,
        } = value;
        Self {
            id: id.into(),
            name: name.into(),
            user_id: user_id.into(),
            created_at,
        }
    }
}

impl TryFrom<HuntDto> for Hunt {
    type Error = HuntValidationError;

    fn try_from(value: HuntDto) -> Result<Self, Self::Error> {
        Hunt::try_from_parts(value.id, value.name, value.user_id, value.created_at)
    }
}
