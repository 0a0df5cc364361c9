//! SQLite-backed `PostRepository` implementation using Diesel ORM.
//!
//! The unique index on `slug` surfaces as a typed duplicate error; content
//! search relies on SQLite's `LIKE`, which is case-insensitive for ASCII.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::{Post, PostDraft, PostId, UserId};

use super::models::{NewPostRow, PostChangeset, PostRow};
use super::pool::{DbPool, PoolError};
use super::schema::posts;

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check out a connection and run `query` on the blocking pool.
    async fn run<T, F>(&self, query: F) -> Result<T, PostPersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, PostPersistenceError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(map_pool_error)?;
            query(&mut conn)
        })
        .await
        .map_err(|err| PostPersistenceError::connection(format!("blocking task failed: {err}")))?
    }
}

/// Map pool errors to domain post persistence errors.
fn map_pool_error(error: PoolError) -> PostPersistenceError {
    match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::Migration { message } => PostPersistenceError::connection(message),
    }
}

/// Map Diesel errors to domain post persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> PostPersistenceError {
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
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.message().contains("posts.slug") =>
        {
            PostPersistenceError::DuplicateSlug
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PostPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => PostPersistenceError::query("record not found"),
        _ => PostPersistenceError::query("database error"),
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(
        &self,
        author: UserId,
        draft: &PostDraft,
    ) -> Result<PostId, PostPersistenceError> {
        let draft = draft.clone();
        self.run(move |conn| {
            let row = NewPostRow {
                title: draft.title(),
                slug: draft.slug(),
                content: draft.content(),
                author_id: author.get(),
                date_posted: Utc::now().naive_utc(),
            };
            let id: i32 = diesel::insert_into(posts::table)
                .values(&row)
                .returning(posts::id)
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(PostId::new(id))
        })
        .await
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostPersistenceError> {
        self.run(move |conn| {
            posts::table
                .find(id.get())
                .select(PostRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(PostRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Post>, PostPersistenceError> {
        self.run(move |conn| {
            posts::table
                .order((posts::date_posted.desc(), posts::id.desc()))
                .select(PostRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(PostRow::into_domain)
                .collect()
        })
        .await
    }

    async fn update(&self, id: PostId, draft: &PostDraft) -> Result<bool, PostPersistenceError> {
        let draft = draft.clone();
        self.run(move |conn| {
            let updated = diesel::update(posts::table.find(id.get()))
                .set(PostChangeset::from_draft(&draft))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostPersistenceError> {
        self.run(move |conn| {
            let deleted = diesel::delete(posts::table.find(id.get()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn search_content(&self, term: &str) -> Result<Vec<Post>, PostPersistenceError> {
        // Escape LIKE metacharacters so the term is matched literally.
        let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        self.run(move |conn| {
            posts::table
                .filter(posts::content.like(pattern).escape('\\'))
                .order(posts::title.asc())
                .select(PostRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(PostRow::into_domain)
                .collect()
        })
        .await
    }
}
