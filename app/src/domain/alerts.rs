//! User-facing rejection reasons and alert copy for hunt intents.
//!
//! Views never inspect provider errors. They receive a domain [`Error`] and
//! turn it into a [`HuntAlert`] through [`HuntAlert::for_error`].

use serde_json::json;

use crate::domain::hunt::{HUNT_NAME_MAX, HuntValidationError};
use crate::domain::{Error, ErrorCode};

/// Normalised reasons a hunt name submission can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntNameRejectionReason {
    Empty,
    TooLong,
    Duplicate,
}

impl HuntNameRejectionReason {
    /// Machine-readable rejection code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong => "too_long",
            Self::Duplicate => "duplicate",
        }
    }

    /// Alert title shown when `intent` is rejected for this reason.
    #[must_use]
    pub const fn title(&self, intent: HuntIntent) -> &'static str {
        match (self, intent) {
            (Self::Empty, _) => "Name required",
            (Self::TooLong, HuntIntent::Rename) => "Too long",
            (Self::TooLong, _) => "Name too long",
            (Self::Duplicate, _) => "Name exists",
        }
    }

    /// Human-readable policy message for `intent`.
    #[must_use]
    pub fn message(&self, intent: HuntIntent) -> String {
        match (self, intent) {
            (Self::Empty, _) => "Please enter a hunt name".to_owned(),
            (Self::TooLong, HuntIntent::Rename) => {
                format!("Name must be <= {HUNT_NAME_MAX} characters")
            }
            (Self::TooLong, _) => format!("Max {HUNT_NAME_MAX} characters"),
            (Self::Duplicate, _) => {
                "You already have a hunt with that name. Pick a unique name.".to_owned()
            }
        }
    }

    /// Parse a rejection code previously produced by [`Self::code`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "empty" => Some(Self::Empty),
            "too_long" => Some(Self::TooLong),
            "duplicate" => Some(Self::Duplicate),
            _ => None,
        }
    }

    pub(crate) fn from_validation_error(err: &HuntValidationError) -> Option<Self> {
        match err {
            HuntValidationError::EmptyName => Some(Self::Empty),
            HuntValidationError::NameTooLong { .. } => Some(Self::TooLong),
            _ => None,
        }
    }

    /// Domain error raised while serving `intent`, carrying this reason in
    /// its details.
    pub fn into_error(self, intent: HuntIntent) -> Error {
        let message = self.message(intent);
        let error = match self {
            Self::Duplicate => Error::conflict(message),
            Self::Empty | Self::TooLong => Error::invalid_request(message),
        };
        error.with_details(json!({ "field": "name", "code": self.code() }))
    }
}

/// User intents that can reach the remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntIntent {
    Create,
    Rename,
    Delete,
}

impl HuntIntent {
    /// Verb used in log fields and authorization messages.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Rename => "edit",
            Self::Delete => "delete",
        }
    }

    /// Alert title for a failed remote call.
    #[must_use]
    pub const fn remote_failure_title(&self) -> &'static str {
        match self {
            Self::Create => "Create failed",
            Self::Rename => "Save failed",
            Self::Delete => "Delete failed",
        }
    }

    /// Generic message for a failed remote call; provider detail stays in logs.
    #[must_use]
    pub const fn remote_failure_message(&self) -> &'static str {
        match self {
            Self::Create => "Could not create hunt",
            Self::Rename => "Could not save changes.",
            Self::Delete => "Could not delete hunt.",
        }
    }

    pub(crate) fn remote_failure(&self) -> Error {
        Error::service_unavailable(self.remote_failure_message())
    }

    pub(crate) fn unauthorized(&self) -> Error {
        let message = match self {
            Self::Create => "You must be signed in to create a hunt.".to_owned(),
            Self::Rename | Self::Delete => {
                format!("You must be signed in to {} this hunt.", self.verb())
            }
        };
        Error::unauthorized(message)
    }

    pub(crate) fn forbidden(&self) -> Error {
        Error::forbidden("You don't own this hunt.")
    }

    pub(crate) fn not_found(&self) -> Error {
        Error::not_found("Hunt not found.")
    }
}

/// Title and body for an alert presented after a failed intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntAlert {
    pub title: String,
    pub message: String,
}

impl HuntAlert {
    /// Map a domain error raised while serving `intent` to alert copy.
    ///
    /// # Examples
    /// ```
    /// use hunts::domain::{HuntAlert, HuntIntent, HuntNameRejectionReason};
    ///
    /// let error = HuntNameRejectionReason::Duplicate.into_error(HuntIntent::Create);
    /// let alert = HuntAlert::for_error(HuntIntent::Create, &error);
    /// assert_eq!(alert.title, "Name exists");
    /// ```
    #[must_use]
    pub fn for_error(intent: HuntIntent, error: &Error) -> Self {
        let reason = error
            .detail_code()
            .and_then(HuntNameRejectionReason::from_code);
        let title = match (error.code(), reason) {
            (ErrorCode::InvalidRequest | ErrorCode::Conflict, Some(reason)) => {
                reason.title(intent)
            }
            (ErrorCode::InvalidRequest, None) => "Invalid input",
            (ErrorCode::Conflict, None) => "Conflict",
            (ErrorCode::NotFound, _) => "Not found",
            (ErrorCode::Unauthorized, _) => "Unauthorized",
            (ErrorCode::Forbidden, _) => "Forbidden",
            (ErrorCode::ServiceUnavailable, _) => intent.remote_failure_title(),
            _ => "Error",
        };
        Self {
            title: title.to_owned(),
            message: error.message().to_owned(),
        }
    }

    /// Acknowledgement shown after a rename is accepted by the remote side.
    #[must_use]
    pub fn renamed() -> Self {
        Self {
            title: "Saved".to_owned(),
            message: "Hunt name updated.".to_owned(),
        }
    }

    /// Prompt shown before a delete is confirmed.
    #[must_use]
    pub fn confirm_delete() -> Self {
        Self {
            title: "Confirm delete".to_owned(),
            message: "Are you sure you want to delete this hunt?".to_owned(),
        }
    }
}
