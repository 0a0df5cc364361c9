//! Shared fixtures for integration tests.
//!
//! Each test gets a fresh migrated SQLite database and upload directory in
//! a temp dir, plus an app wired exactly like the production server except
//! for an ephemeral session key and a non-secure cookie.

use std::path::PathBuf;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use tempfile::TempDir;

use backend::Trace;
use backend::domain::{AuthService, Policy, PostService, UserService};
use backend::inbound::http::auth::{check_password, login, logout, me};
use backend::inbound::http::health::healthz;
use backend::inbound::http::posts::{
    create_post, delete_post, get_post, list_posts, search_posts, update_post,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::uploads::upload_profile_picture;
use backend::inbound::http::users::{
    admin_users, delete_user, get_user, list_users, register, update_user,
};
use backend::outbound::persistence::{
    DbPool, DieselPostRepository, DieselUserRepository, PoolConfig,
};
use backend::outbound::uploads::FsProfilePictureStore;

/// Owns the temp resources backing one test application.
pub struct TestBackend {
    pub state: web::Data<HttpState>,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

/// Build a backend over a fresh database with the given policy.
pub fn backend_with_policy(policy: Policy) -> TestBackend {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("test.db");
    let upload_dir = dir.path().join("uploads");
    let pool =
        DbPool::new(PoolConfig::new(db_path.display().to_string())).expect("pool builds");

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let posts = Arc::new(DieselPostRepository::new(pool));
    let state = web::Data::new(HttpState {
        auth: Arc::new(AuthService::new(users.clone())),
        users: Arc::new(UserService::new(users, policy)),
        posts: Arc::new(PostService::new(posts, policy)),
        pictures: Arc::new(FsProfilePictureStore::new(upload_dir.clone())),
    });

    TestBackend {
        state,
        upload_dir,
        _dir: dir,
    }
}

/// Build a backend with the default policy.
pub fn test_backend() -> TestBackend {
    backend_with_policy(Policy::default())
}

/// Assemble the full route table the way the server does.
pub fn build_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(me)
        .service(check_password)
        .service(register)
        .service(list_users)
        .service(admin_users)
        .service(upload_profile_picture)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(create_post)
        .service(list_posts)
        .service(search_posts)
        .service(get_post)
        .service(update_post)
        .service(delete_post);

    App::new()
        .app_data(state)
        .wrap(Trace)
        .service(api)
        .service(healthz)
}

/// Extract the session cookie from a response.
pub fn session_cookie<B: MessageBody>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// JSON body registering a user with sensible defaults.
pub fn registration_body(name: &str, username: &str, email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "username": username,
        "password": password,
        "passwordConfirmation": password,
    })
}

/// JSON body for the login endpoint.
pub fn login_body(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "password": password })
}

/// JSON body for creating or updating a post.
pub fn post_body(title: &str, slug: &str, content: &str) -> serde_json::Value {
    serde_json::json!({ "title": title, "slug": slug, "content": content })
}

/// Build a single-field multipart payload.
///
/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart_payload(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "test-boundary-7f4a";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
