//! Authorization policy: a pure decision table over actors and actions.
//!
//! Every access rule that was previously scattered through route handlers
//! lives here: who may create posts, who may touch whose records, and who
//! may see the admin surface. Handlers ask, the policy answers; neither
//! repositories nor services re-implement the rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::user::{User, UserId};

/// Authenticated principal attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    is_admin: bool,
}

impl Actor {
    /// Construct an actor from raw parts.
    #[must_use]
    pub const fn new(id: UserId, is_admin: bool) -> Self {
        Self { id, is_admin }
    }

    /// Derive the actor for a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id(),
            is_admin: user.is_admin(),
        }
    }

    /// The acting user's identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Action a caller wants to perform, with the data the decision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a new post owned by the actor.
    CreatePost,
    /// Edit the post owned by `author`.
    EditPost {
        /// The post's owner.
        author: UserId,
    },
    /// Delete the post owned by `author`.
    DeletePost {
        /// The post's owner.
        author: UserId,
    },
    /// View the admin surface.
    ViewAdmin,
    /// Update the profile of `user`.
    EditUser {
        /// The record under edit.
        user: UserId,
    },
    /// Delete the account of `user`.
    DeleteUser {
        /// The record under deletion.
        user: UserId,
    },
}

/// Who may delete user accounts.
///
/// The original application enforced nothing here; the rule is an explicit
/// configuration entry point rather than a hard-coded behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserDeletionPolicy {
    /// The account owner or an admin may delete (default).
    #[default]
    SelfOrAdmin,
    /// Only an admin may delete.
    AdminOnly,
    /// Anyone, including anonymous callers, may delete by id. Matches the
    /// permissive legacy behavior and exists only for explicit opt-in.
    Unrestricted,
}

/// Error returned when parsing a [`UserDeletionPolicy`] from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUserDeletionPolicyError(String);

impl fmt::Display for ParseUserDeletionPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown user deletion policy '{}'; expected self-or-admin, admin-only, or unrestricted",
            self.0
        )
    }
}

impl std::error::Error for ParseUserDeletionPolicyError {}

impl FromStr for UserDeletionPolicy {
    type Err = ParseUserDeletionPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "self-or-admin" => Ok(Self::SelfOrAdmin),
            "admin-only" => Ok(Self::AdminOnly),
            "unrestricted" => Ok(Self::Unrestricted),
            other => Err(ParseUserDeletionPolicyError(other.to_owned())),
        }
    }
}

/// The configured policy table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    user_deletion: UserDeletionPolicy,
}

impl Policy {
    /// Construct a policy with the given user-deletion rule.
    #[must_use]
    pub const fn new(user_deletion: UserDeletionPolicy) -> Self {
        Self { user_deletion }
    }

    /// The configured user-deletion rule.
    pub fn user_deletion(&self) -> UserDeletionPolicy {
        self.user_deletion
    }

    /// Decide whether `actor` may perform `action`.
    ///
    /// Pure: no I/O, no clock, no randomness.
    #[must_use]
    pub fn allows(&self, actor: Option<&Actor>, action: &Action) -> bool {
        match action {
            Action::CreatePost => actor.is_some(),
            Action::EditPost { author } | Action::DeletePost { author } => {
                actor.is_some_and(|actor| actor.id() == *author)
            }
            Action::ViewAdmin => actor.is_some_and(Actor::is_admin),
            Action::EditUser { user } => {
                actor.is_some_and(|actor| actor.id() == *user || actor.is_admin())
            }
            Action::DeleteUser { user } => match self.user_deletion {
                UserDeletionPolicy::Unrestricted => true,
                UserDeletionPolicy::AdminOnly => actor.is_some_and(Actor::is_admin),
                UserDeletionPolicy::SelfOrAdmin => {
                    actor.is_some_and(|actor| actor.id() == *user || actor.is_admin())
                }
            },
        }
    }
}
