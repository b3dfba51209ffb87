//! Sign-in credentials and the session manager.
//!
//! The [`SessionManager`] owns the current [`SessionState`] and publishes it on
//! a `tokio::sync::watch` channel. The sync controller follows that channel
//! instead of reading a global "current user".

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{Error, SessionState, UserId};

/// Domain error returned when sign-in form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for SignInValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for SignInValidationError {}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use hunts::domain::SignInCredentials;
///
/// let creds = SignInCredentials::try_from_parts(" ana@example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ana@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, SignInValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(SignInValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(SignInValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used as the account key.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the user.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// User-facing reasons a sign-in attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFailure {
    InvalidCredentials,
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    Other,
}

impl SignInFailure {
    /// Map a provider error onto the messages the sign-in screen shows.
    pub fn from_provider(err: &AuthProviderError) -> Self {
        match err.provider_code() {
            Some("auth/user-not-found") => Self::UserNotFound,
            Some("auth/wrong-password") => Self::WrongPassword,
            Some("auth/invalid-email") => Self::InvalidEmail,
            _ => Self::Other,
        }
    }

    /// Message shown under the sign-in form.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => {
                "Invalid credentials. Please check your email and password."
            }
            Self::UserNotFound => "No account found for that email.",
            Self::WrongPassword => "Incorrect password.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::Other => "Authentication failed. Please try again.",
        }
    }
}

impl fmt::Display for SignInFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for SignInFailure {}

impl From<SignInValidationError> for SignInFailure {
    fn from(_: SignInValidationError) -> Self {
        Self::InvalidCredentials
    }
}

/// Owns the session state and drives the authentication port.
pub struct SessionManager<A> {
    provider: Arc<A>,
    state: watch::Sender<SessionState>,
}

impl<A> SessionManager<A>
where
    A: AuthProvider,
{
    /// Create a manager in the signed-out state.
    pub fn new(provider: Arc<A>) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self { provider, state }
    }

    /// Receiver observing every published session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current session state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Validate the form, then exchange credentials for a session.
    ///
    /// The state is [`SessionState::Loading`] while the provider call is in
    /// flight and ends as `SignedIn` or `SignedOut`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, SignInFailure> {
        let credentials = SignInCredentials::try_from_parts(email, password)?;
        self.state.send_replace(SessionState::Loading);
        match self.provider.sign_in(&credentials).await {
            Ok(uid) => {
                info!(user_id = %uid, "signed in");
                self.state.send_replace(SessionState::SignedIn(uid.clone()));
                Ok(uid)
            }
            Err(err) => {
                warn!(error = %err, "sign-in rejected");
                self.state.send_replace(SessionState::SignedOut);
                Err(SignInFailure::from_provider(&err))
            }
        }
    }

    /// End the session. The local state is signed out even when the provider
    /// call fails.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let result = self.provider.sign_out().await;
        self.state.send_replace(SessionState::SignedOut);
        result.map_err(|err| {
            warn!(error = %err, "sign-out failed at the provider");
            Error::service_unavailable("Could not sign out.")
        })
    }
}
