//! Port for the hosted authentication service.

use async_trait::async_trait;

use crate::domain::{SignInCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by authentication adapters.
    pub enum AuthProviderError {
        /// The provider rejected the credentials with a provider error code
        /// such as `auth/wrong-password`.
        Rejected { code: String } => "authentication rejected: {code}",
        /// The provider could not be reached.
        Connection { message: String } => "authentication provider unreachable: {message}",
    }
}

impl AuthProviderError {
    /// Provider error code, when the provider supplied one.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code } => Some(code.as_str()),
            Self::Connection { .. } => None,
        }
    }
}

/// Port for signing users in and out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for the account's stable uid.
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<UserId, AuthProviderError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), AuthProviderError>;
}

/// Fixture provider that accepts any credentials as user `fixture-user`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn sign_in(&self, _credentials: &SignInCredentials) -> Result<UserId, AuthProviderError> {
        UserId::new("fixture-user").map_err(|err| AuthProviderError::connection(err.to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        Ok(())
    }
}
