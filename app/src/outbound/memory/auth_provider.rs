//! In-memory authentication provider with provider-style error codes.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{SignInCredentials, UserId};

struct Account {
    password: Zeroizing<String>,
    uid: UserId,
}

/// Email/password accounts held in memory.
///
/// Rejections carry the same codes the hosted provider uses:
/// `auth/invalid-email`, `auth/user-not-found`, and `auth/wrong-password`.
#[derive(Default)]
pub struct InMemoryAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, replacing any previous one for `email`.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, uid: UserId) -> Self {
        self.add_account(email, password, uid);
        self
    }

    /// Register an account on a shared provider.
    pub fn add_account(&self, email: &str, password: &str, uid: UserId) {
        let account = Account {
            password: Zeroizing::new(password.to_owned()),
            uid,
        };
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email.trim().to_lowercase(), account);
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<UserId, AuthProviderError> {
        let email = credentials.email().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(AuthProviderError::rejected("auth/invalid-email"));
        }
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let account = accounts
            .get(&email)
            .ok_or_else(|| AuthProviderError::rejected("auth/user-not-found"))?;
        if account.password.as_str() != credentials.password() {
            return Err(AuthProviderError::rejected("auth/wrong-password"));
        }
        Ok(account.uid.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
