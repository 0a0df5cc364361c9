//! Blog post handlers.
//!
//! ```text
//! POST   /api/v1/posts
//! GET    /api/v1/posts
//! GET    /api/v1/posts/search?q=term
//! GET    /api/v1/posts/{id}
//! PUT    /api/v1/posts/{id}
//! DELETE /api/v1/posts/{id}
//! ```
//!
//! `posts/search` must be registered before `posts/{id}` so the literal
//! segment wins over the parameter.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Post, PostDraft, PostId, PostValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Public view of a post record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: UserId,
    pub date_posted: NaiveDateTime,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id(),
            title: post.title().to_owned(),
            slug: post.slug().to_owned(),
            content: post.content().to_owned(),
            author_id: post.author(),
            date_posted: post.date_posted(),
        }
    }
}

/// Request body for creating or updating a post.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub title: String,
    pub slug: String,
    pub content: String,
}

fn map_post_validation_error(err: PostValidationError) -> Error {
    let field = err.field();
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn draft_from(request: &PostRequest) -> ApiResult<PostDraft> {
    PostDraft::new(&request.title, &request.slug, &request.content)
        .map_err(map_post_validation_error)
}

/// Create a post owned by the session's user.
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let draft = draft_from(&payload)?;
    let post = state.posts.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(&post)))
}

/// List all posts, most recent first.
#[get("/posts")]
pub async fn list_posts(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let posts = state.posts.list().await?;
    Ok(web::Json(posts.iter().map(PostResponse::from).collect()))
}

/// Query string for `GET /api/v1/posts/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Posts whose content contains the search term.
#[get("/posts/search")]
pub async fn search_posts(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let term = query.q.as_deref().unwrap_or_default();
    let posts = state.posts.search(term).await?;
    Ok(web::Json(posts.iter().map(PostResponse::from).collect()))
}

/// Fetch one post by id.
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<PostResponse>> {
    let post = state.posts.get(PostId::new(path.into_inner())).await?;
    Ok(web::Json(PostResponse::from(&post)))
}

/// Overwrite the writable fields of one post. Owner only.
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<PostRequest>,
) -> ApiResult<web::Json<PostResponse>> {
    let actor = state.require_actor(&session).await?;
    let draft = draft_from(&payload)?;
    let post = state
        .posts
        .update(PostId::new(path.into_inner()), &actor, draft)
        .await?;
    Ok(web::Json(PostResponse::from(&post)))
}

/// Delete one post. Owner only.
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    state
        .posts
        .delete(PostId::new(path.into_inner()), &actor)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
