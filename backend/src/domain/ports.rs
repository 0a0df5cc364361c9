//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (databases, file storage). Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of
//! returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::password::PasswordHash;
use super::post::{Post, PostDraft, PostId};
use super::user::{Profile, User, UserId};

/// Unique user attribute that collided on insert or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateUserField {
    /// The email address is already registered.
    Email,
    /// The username is already taken.
    Username,
}

impl std::fmt::Display for DuplicateUserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Username => write!(f, "username"),
        }
    }
}

/// Errors surfaced by the user persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Database connectivity or checkout failures.
    #[error("user storage connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query execution failures.
    #[error("user storage query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
    /// A unique index rejected the write. This is the authoritative
    /// duplicate signal; application-level pre-checks only improve messages.
    #[error("duplicate user {field}")]
    Duplicate {
        /// The colliding attribute.
        field: DuplicateUserField,
    },
    /// Deletion blocked because posts still reference the user.
    #[error("user is still referenced by posts")]
    Referenced,
}

impl UserPersistenceError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the post persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostPersistenceError {
    /// Database connectivity or checkout failures.
    #[error("post storage connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query execution failures.
    #[error("post storage query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
    /// The slug unique index rejected the write.
    #[error("duplicate post slug")]
    DuplicateSlug,
}

impl PostPersistenceError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Fields of a user record about to be created.
///
/// The creation timestamp is stamped by the adapter at insert time; the
/// identifier is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Validated profile fields.
    pub profile: Profile,
    /// Salted hash of the registration password.
    pub password_hash: PasswordHash,
    /// Whether the record holds the admin role, decided at creation.
    pub is_admin: bool,
}

/// CRUD over user records, enforcing uniqueness at the storage layer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return its assigned identifier.
    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Exact-match lookup by email; uniqueness guarantees at most one hit.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Exact-match lookup by username; uniqueness guarantees at most one hit.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Overwrite the self-service profile fields of an existing user.
    ///
    /// Returns `false` when no record with `id` exists.
    async fn update_profile(
        &self,
        id: UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError>;

    /// Record the stored filename of an uploaded profile picture.
    ///
    /// Returns `false` when no record with `id` exists.
    async fn set_profile_picture(
        &self,
        id: UserId,
        stored_filename: &str,
    ) -> Result<bool, UserPersistenceError>;

    /// Delete a user record.
    ///
    /// Returns `false` when no record with `id` exists. Fails with
    /// [`UserPersistenceError::Referenced`] when posts still point at the
    /// user; the record is left unchanged.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// All users ordered by creation time, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Number of stored users.
    async fn count(&self) -> Result<i64, UserPersistenceError>;
}

/// CRUD over post records plus the content search query.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post owned by `author` and return its identifier.
    async fn insert(
        &self,
        author: UserId,
        draft: &PostDraft,
    ) -> Result<PostId, PostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// All posts ordered by creation time, most recent first.
    async fn list(&self) -> Result<Vec<Post>, PostPersistenceError>;

    /// Overwrite the writable fields of an existing post.
    ///
    /// Returns `false` when no record with `id` exists.
    async fn update(&self, id: PostId, draft: &PostDraft) -> Result<bool, PostPersistenceError>;

    /// Delete a post record.
    ///
    /// Returns `false` when no record with `id` exists.
    async fn delete(&self, id: PostId) -> Result<bool, PostPersistenceError>;

    /// Posts whose content contains `term` as a case-insensitive substring,
    /// ordered by title ascending.
    async fn search_content(&self, term: &str) -> Result<Vec<Post>, PostPersistenceError>;
}

/// Errors surfaced by the profile picture store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The original filename reduced to nothing after sanitisation.
    #[error("upload filename is invalid")]
    InvalidFilename,
    /// Writing the file failed.
    #[error("failed to store upload: {message}")]
    Io {
        /// Underlying failure description.
        message: String,
    },
}

impl UploadError {
    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Content store for uploaded profile pictures.
///
/// Implementations persist the bytes under a collision-free generated name
/// and hand back only that stored filename; callers record the string on the
/// user record.
#[async_trait]
pub trait ProfilePictureStore: Send + Sync {
    /// Persist `bytes` under a unique name derived from `original_filename`.
    async fn save(
        &self,
        original_filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError>;
}
