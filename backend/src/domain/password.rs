//! Password hashing primitives.
//!
//! Passwords are stored as argon2 PHC strings with a fresh random salt per
//! hash, so two hashes of the same plaintext never compare equal while both
//! verify. Plaintext passwords are never persisted and the stored hash is
//! opaque: there is no API for reading a password back.

use std::fmt;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash as PhcString, SaltString};
use thiserror::Error;

/// Failure raised while deriving a password hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// The operating system could not supply salt entropy.
    #[error("failed to generate password salt: {message}")]
    Salt {
        /// Underlying failure description.
        message: String,
    },
    /// The hashing function itself failed.
    #[error("failed to hash password: {message}")]
    Hash {
        /// Underlying failure description.
        message: String,
    },
}

/// Salted one-way hash of a user password.
///
/// ## Invariants
/// - Holds a PHC-formatted argon2 string; the plaintext is unrecoverable.
/// - `Debug` output never reveals the stored hash.
#[derive(Clone)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Derive a salted hash from a plaintext password.
    ///
    /// Each call draws a fresh random salt, so repeated calls with the same
    /// input produce distinct stored values.
    pub fn derive(plaintext: &str) -> Result<Self, PasswordHashError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|err| PasswordHashError::Salt {
            message: err.to_string(),
        })?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| PasswordHashError::Salt {
            message: err.to_string(),
        })?;
        let phc = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::Hash {
                message: err.to_string(),
            })?
            .to_string();
        Ok(Self(phc))
    }

    /// Reconstruct a hash from its stored PHC string.
    ///
    /// Intended for persistence adapters reading previously derived hashes;
    /// a malformed string simply fails every verification.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Return `true` iff `plaintext` matches the password this hash was
    /// derived from.
    pub fn verify(&self, plaintext: &str) -> bool {
        match PhcString::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Borrow the stored PHC string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pw123456")]
    #[case("correct horse battery staple")]
    #[case("")]
    fn derived_hashes_verify_their_plaintext(#[case] plaintext: &str) {
        let hash = PasswordHash::derive(plaintext).expect("hashing succeeds");
        assert!(hash.verify(plaintext));
        assert_ne!(hash.as_str(), plaintext);
    }

    #[rstest]
    fn distinct_salts_produce_distinct_hashes() {
        let first = PasswordHash::derive("pw123456").expect("hashing succeeds");
        let second = PasswordHash::derive("pw123456").expect("hashing succeeds");
        assert_ne!(first.as_str(), second.as_str());
        assert!(first.verify("pw123456"));
        assert!(second.verify("pw123456"));
    }

    #[rstest]
    fn wrong_plaintext_fails_verification() {
        let hash = PasswordHash::derive("pw123456").expect("hashing succeeds");
        assert!(!hash.verify("pw1234567"));
    }

    #[rstest]
    fn malformed_stored_hash_never_verifies() {
        let hash = PasswordHash::from_stored("not-a-phc-string");
        assert!(!hash.verify("anything"));
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::derive("pw123456").expect("hashing succeeds");
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }
}
