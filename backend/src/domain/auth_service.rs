//! Credential authentication over the user repository port.
//!
//! Establishing and tearing down sessions is the inbound adapter's job; this
//! service only answers "who is this, and does the password verify".

use std::sync::Arc;

use thiserror::Error;

use super::auth::LoginCredentials;
use super::ports::{UserPersistenceError, UserRepository};
use super::user::User;

/// Failures raised while authenticating credentials.
///
/// Unknown usernames and bad passwords are distinct so the boundary can
/// surface the same two messages the application always has.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No user exists with the supplied username.
    #[error("username not found")]
    UserNotFound,
    /// The user exists but the password did not verify.
    #[error("incorrect password")]
    InvalidCredential,
    /// The lookup itself failed.
    #[error(transparent)]
    Storage(#[from] UserPersistenceError),
}

/// Result of a diagnostic password check.
#[derive(Debug, Clone)]
pub struct PasswordCheck {
    /// The user the check ran against.
    pub user: User,
    /// Whether the supplied password verified against the stored hash.
    pub passed: bool,
}

/// Authentication service bound to a user repository.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Create a new service backed by the given repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Authenticate credentials against the stored password hash.
    ///
    /// Lookup is exact-match on the username.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.password_hash().verify(credentials.password()) {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredential)
        }
    }

    /// Diagnostic check: does `credentials.password()` verify for the user?
    ///
    /// Unlike [`AuthService::authenticate`] a failed verification is a
    /// successful check with `passed == false`; only an unknown username is
    /// an error.
    pub async fn check_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<PasswordCheck, AuthError> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let passed = user.password_hash().verify(credentials.password());
        Ok(PasswordCheck { user, passed })
    }
}
