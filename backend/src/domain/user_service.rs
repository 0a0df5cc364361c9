//! User directory: registration, profile updates, deletion, and lookups.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::error::Error;
use super::password::PasswordHash;
use super::policy::{Action, Actor, Policy};
use super::ports::{NewUser, UserPersistenceError, UserRepository};
use super::user::{Profile, Registration, User, UserId};

/// Adapter-level failures translated into the domain error envelope.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } | UserPersistenceError::Query { message } => {
            Error::internal(message)
        }
        UserPersistenceError::Duplicate { field } => Error::conflict("already registered")
            .with_details(json!({ "field": field.to_string() })),
        // A user who still owns posts cannot be removed; the record is left
        // unchanged and the caller may retry after deleting the posts.
        UserPersistenceError::Referenced => Error::conflict("operation failed, try again"),
    }
}

/// User directory service bound to a repository and the policy table.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    policy: Policy,
}

impl UserService {
    /// Create a new service backed by the given repository and policy.
    pub fn new(users: Arc<dyn UserRepository>, policy: Policy) -> Self {
        Self { users, policy }
    }

    /// Register a new user.
    ///
    /// Email and username are pre-checked for friendlier messages, but the
    /// storage layer's unique indexes remain the authoritative duplicate
    /// signal under concurrent registration.
    ///
    /// The first user registered into an empty directory becomes the admin;
    /// afterwards only an admin actor may grant the role.
    pub async fn register(
        &self,
        registration: Registration,
        actor: Option<&Actor>,
        request_admin: bool,
    ) -> Result<User, Error> {
        let profile = registration.profile();

        if self
            .users
            .find_by_email(profile.email())
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(
                Error::conflict("already registered").with_details(json!({ "field": "email" }))
            );
        }
        if self
            .users
            .find_by_username(profile.username())
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(
                Error::conflict("already registered").with_details(json!({ "field": "username" }))
            );
        }

        // Not atomic with the insert below: two racing registrations into
        // an empty directory can both bootstrap as admin. The deployment
        // has a single writer, so this stays a read-side check.
        let directory_is_empty = self
            .users
            .count()
            .await
            .map_err(map_user_persistence_error)?
            == 0;
        let is_admin = if directory_is_empty {
            true
        } else if request_admin {
            if !self.policy.allows(actor, &Action::ViewAdmin) {
                return Err(Error::forbidden("only an admin may grant the admin role"));
            }
            true
        } else {
            false
        };

        let password_hash = PasswordHash::derive(registration.password())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        let new_user = NewUser {
            profile: profile.clone(),
            password_hash,
            is_admin,
        };
        let id = self
            .users
            .insert(&new_user)
            .await
            .map_err(map_user_persistence_error)?;

        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::internal(format!("registered user {id} could not be re-read")))
    }

    /// Fetch a user by identifier.
    pub async fn get(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("no user with id {id}")))
    }

    /// Exact-match lookup by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Exact-match lookup by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)
    }

    /// All users, oldest first.
    pub async fn list(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_persistence_error)
    }

    /// The admin directory view: all users, gated on the admin role.
    pub async fn admin_directory(&self, actor: &Actor) -> Result<Vec<User>, Error> {
        if !self.policy.allows(Some(actor), &Action::ViewAdmin) {
            return Err(Error::forbidden(
                "you are not authorized to access this page",
            ));
        }
        self.list().await
    }

    fn ensure_profile_editable(&self, id: UserId, actor: &Actor) -> Result<(), Error> {
        if self
            .policy
            .allows(Some(actor), &Action::EditUser { user: id })
        {
            Ok(())
        } else {
            Err(Error::forbidden(
                "you are not authorized to edit this profile",
            ))
        }
    }

    /// Check that `actor` may edit the profile of an existing user `id`.
    ///
    /// Lets callers with side effects of their own, such as the upload
    /// handler, reject the request before producing anything.
    pub async fn authorize_profile_edit(&self, id: UserId, actor: &Actor) -> Result<(), Error> {
        self.ensure_profile_editable(id, actor)?;
        self.get(id).await.map(|_| ())
    }

    /// Overwrite the self-service profile fields of `id`.
    ///
    /// Only the record owner or an admin may update a profile.
    pub async fn update_profile(
        &self,
        id: UserId,
        actor: &Actor,
        profile: Profile,
    ) -> Result<User, Error> {
        self.ensure_profile_editable(id, actor)?;

        let found = self
            .users
            .update_profile(id, &profile)
            .await
            .map_err(map_user_persistence_error)?;
        if !found {
            return Err(Error::not_found(format!("no user with id {id}")));
        }
        self.get(id).await
    }

    /// Record the stored filename of an uploaded profile picture.
    pub async fn set_profile_picture(
        &self,
        id: UserId,
        actor: &Actor,
        stored_filename: &str,
    ) -> Result<(), Error> {
        self.ensure_profile_editable(id, actor)?;

        let found = self
            .users
            .set_profile_picture(id, stored_filename)
            .await
            .map_err(map_user_persistence_error)?;
        if !found {
            return Err(Error::not_found(format!("no user with id {id}")));
        }
        Ok(())
    }

    /// Delete the user record `id`, subject to the configured deletion
    /// policy. A user who still owns posts is never partially deleted; the
    /// blocked delete surfaces as a conflict.
    pub async fn delete(&self, id: UserId, actor: Option<&Actor>) -> Result<(), Error> {
        if !self.policy.allows(actor, &Action::DeleteUser { user: id }) {
            return Err(Error::forbidden(
                "you are not authorized to delete this user",
            ));
        }

        let found = self.users.delete(id).await.map_err(|err| {
            if matches!(err, UserPersistenceError::Referenced) {
                warn!(user_id = %id, "user deletion blocked by referencing posts");
            }
            map_user_persistence_error(err)
        })?;
        if !found {
            return Err(Error::not_found(format!("no user with id {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::policy::UserDeletionPolicy;
    use crate::domain::ports::DuplicateUserField;
    use crate::domain::test_support::{InMemoryUsers, fixture_user};
    use rstest::rstest;

    fn registration(username: &str, email: &str) -> Registration {
        let profile = Profile::new("Some Name", email, username, None, None).expect("valid");
        Registration::new(profile, "pw123456", "pw123456").expect("valid")
    }

    fn service(users: Arc<InMemoryUsers>) -> UserService {
        UserService::new(users, Policy::default())
    }

    #[tokio::test]
    async fn first_registration_bootstraps_the_admin() {
        let users = Arc::new(InMemoryUsers::default());
        let service = service(users.clone());

        let first = service
            .register(registration("alice", "alice@x.com"), None, false)
            .await
            .expect("first registration succeeds");
        assert!(first.is_admin());

        let second = service
            .register(registration("bob", "bob@x.com"), None, false)
            .await
            .expect("second registration succeeds");
        assert!(!second.is_admin());
    }

    #[tokio::test]
    async fn registered_password_verifies_and_is_not_stored_plaintext() {
        let users = Arc::new(InMemoryUsers::default());
        let service = service(users.clone());

        service
            .register(registration("alice", "alice@x.com"), None, false)
            .await
            .expect("registration succeeds");

        let stored = service
            .find_by_email("alice@x.com")
            .await
            .expect("lookup runs")
            .expect("user exists");
        assert!(stored.password_hash().verify("pw123456"));
        assert_ne!(stored.password_hash().as_str(), "pw123456");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_and_creates_nothing() {
        let users = Arc::new(InMemoryUsers::default());
        let service = service(users.clone());

        service
            .register(registration("alice", "alice@x.com"), None, false)
            .await
            .expect("first registration succeeds");
        let before = users.len();

        let err = service
            .register(registration("alice2", "alice@x.com"), None, false)
            .await
            .expect_err("duplicate email must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(users.len(), before);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let users = Arc::new(InMemoryUsers::with_users(vec![fixture_user(
            1,
            "alice",
            "alice@x.com",
            "pw123456",
        )]));
        let service = service(users.clone());

        let err = service
            .register(registration("alice", "other@x.com"), None, false)
            .await
            .expect_err("duplicate username must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn admin_grant_requires_an_admin_actor() {
        let users = Arc::new(InMemoryUsers::with_users(vec![fixture_user(
            1,
            "alice",
            "alice@x.com",
            "pw123456",
        )]));
        let service = service(users.clone());

        let member = Actor::new(UserId::new(1), false);
        let err = service
            .register(registration("bob", "bob@x.com"), Some(&member), true)
            .await
            .expect_err("non-admin may not grant admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let admin = Actor::new(UserId::new(1), true);
        let user = service
            .register(registration("carol", "carol@x.com"), Some(&admin), true)
            .await
            .expect("admin grant succeeds");
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn profile_updates_are_owner_scoped() {
        let users = Arc::new(InMemoryUsers::with_users(vec![
            fixture_user(1, "alice", "alice@x.com", "pw123456"),
            fixture_user(2, "bob", "bob@x.com", "pw123456"),
        ]));
        let service = service(users.clone());
        let profile =
            Profile::new("Alice Renamed", "alice@x.com", "alice", Some("red"), None)
                .expect("valid");

        let intruder = Actor::new(UserId::new(2), false);
        let err = service
            .update_profile(UserId::new(1), &intruder, profile.clone())
            .await
            .expect_err("non-owner must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let owner = Actor::new(UserId::new(1), false);
        let updated = service
            .update_profile(UserId::new(1), &owner, profile)
            .await
            .expect("owner update succeeds");
        assert_eq!(updated.profile().name(), "Alice Renamed");
        assert_eq!(updated.profile().favorite_color(), Some("red"));
    }

    #[tokio::test]
    async fn profile_edit_authorization_checks_policy_and_existence() {
        let users = Arc::new(InMemoryUsers::with_users(vec![
            fixture_user(1, "alice", "alice@x.com", "pw123456"),
            fixture_user(2, "bob", "bob@x.com", "pw123456"),
        ]));
        let service = service(users.clone());

        let intruder = Actor::new(UserId::new(2), false);
        let err = service
            .authorize_profile_edit(UserId::new(1), &intruder)
            .await
            .expect_err("non-owner must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let admin = Actor::new(UserId::new(2), true);
        let err = service
            .authorize_profile_edit(UserId::new(9), &admin)
            .await
            .expect_err("missing target must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let owner = Actor::new(UserId::new(1), false);
        service
            .authorize_profile_edit(UserId::new(1), &owner)
            .await
            .expect("owner is authorized");
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let users = Arc::new(InMemoryUsers::default());
        let service = service(users.clone());
        let actor = Actor::new(UserId::new(9), false);
        let profile = Profile::new("Ghost", "ghost@x.com", "ghost", None, None).expect("valid");

        let err = service
            .update_profile(UserId::new(9), &actor, profile)
            .await
            .expect_err("missing user must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(UserDeletionPolicy::SelfOrAdmin, 2, false, ErrorCode::Forbidden)]
    #[case(UserDeletionPolicy::AdminOnly, 1, false, ErrorCode::Forbidden)]
    #[tokio::test]
    async fn deletion_policy_denials(
        #[case] rule: UserDeletionPolicy,
        #[case] actor_id: i32,
        #[case] actor_admin: bool,
        #[case] expected: ErrorCode,
    ) {
        let users = Arc::new(InMemoryUsers::with_users(vec![
            fixture_user(1, "alice", "alice@x.com", "pw123456"),
            fixture_user(2, "bob", "bob@x.com", "pw123456"),
        ]));
        let service = UserService::new(users.clone(), Policy::new(rule));
        let actor = Actor::new(UserId::new(actor_id), actor_admin);

        let err = service
            .delete(UserId::new(1), Some(&actor))
            .await
            .expect_err("must be denied");
        assert_eq!(err.code(), expected);
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn self_deletion_succeeds_under_the_default_policy() {
        let users = Arc::new(InMemoryUsers::with_users(vec![fixture_user(
            1,
            "alice",
            "alice@x.com",
            "pw123456",
        )]));
        let service = service(users.clone());
        let actor = Actor::new(UserId::new(1), false);

        service
            .delete(UserId::new(1), Some(&actor))
            .await
            .expect("self deletion succeeds");
        assert_eq!(users.len(), 0);
    }

    #[tokio::test]
    async fn blocked_deletion_surfaces_as_conflict() {
        let users = Arc::new(InMemoryUsers::with_users(vec![fixture_user(
            1,
            "alice",
            "alice@x.com",
            "pw123456",
        )]));
        users.fail_next(UserPersistenceError::Referenced);
        let service = service(users.clone());
        let actor = Actor::new(UserId::new(1), false);

        let err = service
            .delete(UserId::new(1), Some(&actor))
            .await
            .expect_err("blocked delete must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_field_mapping_names_the_field() {
        let error = map_user_persistence_error(UserPersistenceError::Duplicate {
            field: DuplicateUserField::Username,
        });
        assert_eq!(error.code(), ErrorCode::Conflict);
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "username");
    }
}
