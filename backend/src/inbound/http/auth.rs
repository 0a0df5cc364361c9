//! Session authentication handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"alice","password":"pw123456"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! POST /api/v1/password-checks {"username":"alice","password":"guess"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::user_service::map_user_persistence_error;
use crate::domain::{AuthError, Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Authentication failures stay distinguishable so a caller knows whether
/// the username or the password was wrong; both map to 401.
fn map_auth_error(err: AuthError) -> Error {
    match err {
        AuthError::UserNotFound => Error::unauthorized("username not found"),
        AuthError::InvalidCredential => Error::unauthorized("incorrect password"),
        AuthError::Storage(err) => map_user_persistence_error(err),
    }
}

/// Authenticate credentials and establish a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state
        .auth
        .authenticate(&credentials)
        .await
        .map_err(map_auth_error)?;
    session.persist_user(user.id())?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Drop the session. Safe to call without one.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The currently authenticated user.
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .current_user(&session)
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Response body for `POST /api/v1/password-checks`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCheckResponse {
    pub username: String,
    pub passed: bool,
}

/// Diagnostic password verification without establishing a session.
///
/// A wrong password is a successful check reporting `passed: false`; only
/// an unknown username is an error.
#[post("/password-checks")]
pub async fn check_password(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<PasswordCheckResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let check = state
        .auth
        .check_password(&credentials)
        .await
        .map_err(|err| match err {
            AuthError::UserNotFound => Error::not_found("username not found"),
            other => map_auth_error(other),
        })?;
    Ok(web::Json(PasswordCheckResponse {
        username: check.user.username().to_owned(),
        passed: check.passed,
    }))
}
