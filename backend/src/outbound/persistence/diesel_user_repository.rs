//! SQLite-backed `UserRepository` implementation using Diesel ORM.
//!
//! This adapter implements the domain's `UserRepository` port. Queries run
//! on the blocking thread pool because SQLite work is synchronous; the
//! unique indexes on `username` and `email` surface as typed duplicate
//! errors and the posts foreign key blocks deletion of referenced users.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{DuplicateUserField, NewUser, UserPersistenceError, UserRepository};
use crate::domain::{Profile, User, UserId};

use super::models::{NewUserRow, ProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check out a connection and run `query` on the blocking pool.
    async fn run<T, F>(&self, query: F) -> Result<T, UserPersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, UserPersistenceError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(map_pool_error)?;
            query(&mut conn)
        })
        .await
        .map_err(|err| UserPersistenceError::connection(format!("blocking task failed: {err}")))?
    }
}

/// Map pool errors to domain user persistence errors.
fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::Migration { message } => UserPersistenceError::connection(message),
    }
}

/// Map Diesel errors to domain user persistence errors.
///
/// SQLite reports which unique index rejected a write only through the error
/// message, so the colliding field is recovered by inspecting it.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let message = info.message();
            if message.contains("users.email") {
                UserPersistenceError::Duplicate {
                    field: DuplicateUserField::Email,
                }
            } else if message.contains("users.username") {
                UserPersistenceError::Duplicate {
                    field: DuplicateUserField::Username,
                }
            } else {
                UserPersistenceError::query("unique constraint violation")
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            UserPersistenceError::Referenced
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        _ => UserPersistenceError::query("database error"),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let user = user.clone();
        self.run(move |conn| {
            let row = NewUserRow {
                username: user.profile.username(),
                name: user.profile.name(),
                email: user.profile.email(),
                favorite_color: user.profile.favorite_color(),
                about_author: user.profile.about_author(),
                password_hash: user.password_hash.as_str(),
                is_admin: user.is_admin,
                date_added: Utc::now().naive_utc(),
            };
            let id: i32 = diesel::insert_into(users::table)
                .values(&row)
                .returning(users::id)
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(UserId::new(id))
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.run(move |conn| {
            users::table
                .find(id.get())
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(UserRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let email = email.to_owned();
        self.run(move |conn| {
            users::table
                .filter(users::email.eq(email))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(UserRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let username = username.to_owned();
        self.run(move |conn| {
            users::table
                .filter(users::username.eq(username))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(UserRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError> {
        let profile = profile.clone();
        self.run(move |conn| {
            let updated = diesel::update(users::table.find(id.get()))
                .set(ProfileChangeset::from_profile(&profile))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn set_profile_picture(
        &self,
        id: UserId,
        stored_filename: &str,
    ) -> Result<bool, UserPersistenceError> {
        let stored_filename = stored_filename.to_owned();
        self.run(move |conn| {
            let updated = diesel::update(users::table.find(id.get()))
                .set(users::profile_picture.eq(Some(stored_filename)))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        self.run(move |conn| {
            let deleted = diesel::delete(users::table.find(id.get()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        self.run(move |conn| {
            users::table
                .order(users::date_added.asc())
                .select(UserRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(UserRow::into_domain)
                .collect()
        })
        .await
    }

    async fn count(&self) -> Result<i64, UserPersistenceError> {
        self.run(move |conn| {
            users::table
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("pool exhausted"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[rstest]
    #[case("UNIQUE constraint failed: users.email", DuplicateUserField::Email)]
    #[case("UNIQUE constraint failed: users.username", DuplicateUserField::Username)]
    fn unique_violations_name_the_colliding_field(
        #[case] message: &str,
        #[case] expected: DuplicateUserField,
    ) {
        let err = map_diesel_error(database_error(DatabaseErrorKind::UniqueViolation, message));
        assert_eq!(
            err,
            UserPersistenceError::Duplicate { field: expected }
        );
    }

    #[rstest]
    fn foreign_key_violations_map_to_referenced() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "FOREIGN KEY constraint failed",
        ));
        assert_eq!(err, UserPersistenceError::Referenced);
    }

    #[rstest]
    fn other_errors_map_to_query_errors() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
