//! Core domain model for the blog backend.
//!
//! Pure types and services with no web or database dependencies. Adapters on
//! either side of the hexagon speak to this module through the traits in
//! [`ports`] and the validated types re-exported below.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod password;
pub mod policy;
pub mod ports;
pub mod post;
pub mod post_service;
mod slug;
pub mod user;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{LoginCredentials, LoginValidationError};
pub use auth_service::{AuthError, AuthService, PasswordCheck};
pub use error::{Error, ErrorCode, ErrorValidationError};
pub use password::{PasswordHash, PasswordHashError};
pub use policy::{Action, Actor, Policy, UserDeletionPolicy};
pub use post::{Post, PostDraft, PostId, PostValidationError};
pub use post_service::PostService;
pub use user::{Profile, Registration, User, UserId, UserValidationError};
pub use user_service::UserService;
