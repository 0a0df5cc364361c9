//! User directory handlers.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/admin/users
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Actor, Error, Profile, Registration, User, UserId, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Public view of a user record. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub is_admin: bool,
    pub date_added: NaiveDateTime,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_owned(),
            name: user.profile().name().to_owned(),
            email: user.email().to_owned(),
            favorite_color: user.profile().favorite_color().map(ToOwned::to_owned),
            about_author: user.profile().about_author().map(ToOwned::to_owned),
            profile_picture: user.profile_picture().map(ToOwned::to_owned),
            is_admin: user.is_admin(),
            date_added: user.date_added(),
        }
    }
}

/// Registration request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub favorite_color: Option<String>,
    #[serde(default)]
    pub about_author: Option<String>,
    /// Request the admin role; honoured only for admin callers.
    #[serde(default)]
    pub is_admin: bool,
}

/// Profile update body for `PUT /api/v1/users/{id}`.
///
/// Every field is overwritten; omitting an optional field clears it.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub favorite_color: Option<String>,
    #[serde(default)]
    pub about_author: Option<String>,
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let field = err.field();
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn profile_from(request: &ProfileRequest) -> ApiResult<Profile> {
    Profile::new(
        &request.name,
        &request.email,
        &request.username,
        request.favorite_color.as_deref(),
        request.about_author.as_deref(),
    )
    .map_err(map_user_validation_error)
}

/// Register a new user.
///
/// Open to unauthenticated callers; `isAdmin` is honoured only when the
/// caller is an authenticated admin, except that the very first user always
/// becomes the admin.
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let profile = Profile::new(
        &request.name,
        &request.email,
        &request.username,
        request.favorite_color.as_deref(),
        request.about_author.as_deref(),
    )
    .map_err(map_user_validation_error)?;
    let registration = Registration::new(profile, &request.password, &request.password_confirmation)
        .map_err(map_user_validation_error)?;

    let actor = state
        .current_user(&session)
        .await?
        .map(|user| Actor::from_user(&user));
    let user = state
        .users
        .register(registration, actor.as_ref(), request.is_admin)
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// List all users, oldest first.
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list().await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Fetch one user by id.
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get(UserId::new(path.into_inner())).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Overwrite the profile fields of one user. Owner or admin only.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = state.require_actor(&session).await?;
    let profile = profile_from(&payload)?;
    let user = state
        .users
        .update_profile(UserId::new(path.into_inner()), &actor, profile)
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Delete one user, subject to the configured deletion policy.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    let actor = state
        .current_user(&session)
        .await?
        .map(|user| Actor::from_user(&user));
    state.users.delete(id, actor.as_ref()).await?;
    // Deleting your own account also ends the session.
    if actor.is_some_and(|actor| actor.id() == id) {
        session.clear();
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Admin-only directory of all users.
#[get("/admin/users")]
pub async fn admin_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let actor = state.require_actor(&session).await?;
    let users = state.users.admin_directory(&actor).await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}
