//! Login credential validation.
//!
//! Handlers parse transport payloads and hand the raw strings here, so the
//! services below only ever see credentials that passed the checks.

use thiserror::Error;
use zeroize::Zeroizing;

/// Rejections raised while validating a login payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// The username was blank once surrounding whitespace was removed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginValidationError {
    /// The offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }
}

/// A username/password pair that passed validation.
///
/// The username is stored trimmed because lookups are keyed on the trimmed
/// form. The password is kept verbatim, whitespace included, and zeroised
/// on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw login inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] when either value is blank.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// The trimmed username to look up.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password exactly as the caller supplied it.
    pub fn password(&self) -> &str {
        &self.password
    }
}
