//! Blog posts: owner-scoped CRUD and the content search query.

use std::sync::Arc;

use serde_json::json;

use super::error::Error;
use super::policy::{Action, Actor, Policy};
use super::ports::{PostPersistenceError, PostRepository};
use super::post::{Post, PostDraft, PostId};

/// Adapter-level failures translated into the domain error envelope.
pub(crate) fn map_post_persistence_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } | PostPersistenceError::Query { message } => {
            Error::internal(message)
        }
        PostPersistenceError::DuplicateSlug => {
            Error::conflict("slug already in use").with_details(json!({ "field": "slug" }))
        }
    }
}

/// Post service bound to a repository and the policy table.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    policy: Policy,
}

impl PostService {
    /// Create a new service backed by the given repository and policy.
    pub fn new(posts: Arc<dyn PostRepository>, policy: Policy) -> Self {
        Self { posts, policy }
    }

    /// Create a post owned by the actor.
    pub async fn create(&self, actor: &Actor, draft: PostDraft) -> Result<Post, Error> {
        if !self.policy.allows(Some(actor), &Action::CreatePost) {
            return Err(Error::forbidden("login required to create posts"));
        }
        let id = self
            .posts
            .insert(actor.id(), &draft)
            .await
            .map_err(map_post_persistence_error)?;
        self.get(id).await
    }

    /// Fetch a post by identifier.
    pub async fn get(&self, id: PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(map_post_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("no post with id {id}")))
    }

    /// All posts, most recent first.
    pub async fn list(&self) -> Result<Vec<Post>, Error> {
        self.posts.list().await.map_err(map_post_persistence_error)
    }

    /// Overwrite the writable fields of the post `id`.
    ///
    /// A missing post reports not-found before ownership is considered, so
    /// callers cannot probe which identifiers exist behind the denial.
    pub async fn update(&self, id: PostId, actor: &Actor, draft: PostDraft) -> Result<Post, Error> {
        let existing = self.get(id).await?;
        if !self.policy.allows(
            Some(actor),
            &Action::EditPost {
                author: existing.author(),
            },
        ) {
            return Err(Error::forbidden(
                "you are not authorized to edit this post",
            ));
        }
        let found = self
            .posts
            .update(id, &draft)
            .await
            .map_err(map_post_persistence_error)?;
        if !found {
            return Err(Error::not_found(format!("no post with id {id}")));
        }
        self.get(id).await
    }

    /// Delete the post `id`, owner only.
    pub async fn delete(&self, id: PostId, actor: &Actor) -> Result<(), Error> {
        let existing = self.get(id).await?;
        if !self.policy.allows(
            Some(actor),
            &Action::DeletePost {
                author: existing.author(),
            },
        ) {
            return Err(Error::forbidden(
                "you are not authorized to delete this post",
            ));
        }
        let found = self
            .posts
            .delete(id)
            .await
            .map_err(map_post_persistence_error)?;
        if !found {
            return Err(Error::not_found(format!("no post with id {id}")));
        }
        Ok(())
    }

    /// Posts whose content contains `term`, case-insensitively, ordered by
    /// title. A blank term short-circuits to an empty result without
    /// touching storage.
    pub async fn search(&self, term: &str) -> Result<Vec<Post>, Error> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.posts
            .search_content(term)
            .await
            .map_err(map_post_persistence_error)
    }
}
