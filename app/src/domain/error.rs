//! Errors surfaced to hunt screens.
//!
//! Every failure a user intent can produce is an [`Error`]: a category
//! ([`ErrorCode`]), the alert body, the trace id of the intent that raised it,
//! and optional structured details naming the rejected field. Provider errors
//! never cross this boundary unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Failure category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A hunt name was rejected before any remote call.
    InvalidRequest,
    /// The user already owns a hunt with this name.
    Conflict,
    /// The hunt is not in the local list.
    NotFound,
    /// Nobody is signed in.
    Unauthorized,
    /// Someone else owns the hunt.
    Forbidden,
    /// The document service or auth provider call failed.
    ServiceUnavailable,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Whether the code is one of the two authorization failures: no session,
    /// or a hunt owned by someone else.
    #[must_use]
    pub const fn is_authorization(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an [`Error`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

/// A failed user intent.
///
/// ## Invariants
/// - `message` is never blank.
///
/// # Examples
/// ```
/// use hunts::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Hunt not found.");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "not_found: Hunt not found.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawError")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error, tagging it with the trace id in scope, if any.
    ///
    /// # Panics
    ///
    /// Panics if `message` is blank. Every call site passes fixed copy.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message)
            .unwrap_or_else(|err| panic!("error messages must satisfy validation: {err}"))
    }

    /// Build an error, rejecting a blank message.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        let trace_id = TraceId::current().map(|id| id.to_string());
        Ok(Self {
            code,
            message,
            trace_id,
            details: None,
        })
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Alert body text.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The `code` entry of the details, such as `duplicate` for a name clash.
    pub fn detail_code(&self) -> Option<&str> {
        self.details.as_ref()?.get("code")?.as_str()
    }

    /// Replace the trace id, rejecting a blank one.
    pub fn try_with_trace_id(
        mut self,
        id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(id);
        Ok(self)
    }

    /// Attach structured details.
    ///
    /// # Examples
    /// ```
    /// use hunts::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("Please enter a hunt name")
    ///     .with_details(json!({ "field": "name", "code": "empty" }));
    /// assert_eq!(err.detail_code(), Some("empty"));
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

macro_rules! code_constructors {
    ($($(#[$meta:meta])* $name:ident => $code:ident),+ $(,)?) => {
        impl Error {
            $(
                $(#[$meta])*
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )+
        }
    };
}

code_constructors! {
    /// Name rejected before any remote call.
    invalid_request => InvalidRequest,
    /// Duplicate hunt name.
    conflict => Conflict,
    not_found => NotFound,
    /// No active session.
    unauthorized => Unauthorized,
    /// The hunt belongs to someone else.
    forbidden => Forbidden,
    /// A remote call failed. The message is generic; the provider error is
    /// only logged.
    service_unavailable => ServiceUnavailable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

/// Deserialisation shape; validated into [`Error`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawError {
    code: ErrorCode,
    message: String,
    #[serde(default)]
    trace_id: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

impl TryFrom<RawError> for Error {
    type Error = ErrorValidationError;

    fn try_from(raw: RawError) -> Result<Self, Self::Error> {
        if raw.message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        let error = Self {
            code: raw.code,
            message: raw.message,
            trace_id: None,
            details: raw.details,
        };
        match raw.trace_id {
            Some(id) => error.try_with_trace_id(id),
            None => Ok(error),
        }
    }
}
