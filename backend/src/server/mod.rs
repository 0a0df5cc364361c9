//! Server construction and middleware wiring.

mod config;
mod settings;

pub use config::ServerConfig;
pub use settings::AppSettings;

use std::path::PathBuf;
use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

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
use backend::outbound::persistence::{DbPool, DieselPostRepository, DieselUserRepository};
use backend::outbound::uploads::FsProfilePictureStore;

/// Wire the domain services onto their SQLite and filesystem adapters.
pub fn build_http_state(pool: DbPool, upload_dir: PathBuf, policy: Policy) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let posts = Arc::new(DieselPostRepository::new(pool));
    HttpState {
        auth: Arc::new(AuthService::new(users.clone())),
        users: Arc::new(UserService::new(users, policy)),
        posts: Arc::new(PostService::new(posts, policy)),
        pictures: Arc::new(FsProfilePictureStore::new(upload_dir)),
    }
}

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // `search_posts` precedes `get_post` so the literal segment wins over
    // the id parameter.
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
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(healthz)
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        pool,
        upload_dir,
        policy,
    } = config;

    let http_state = web::Data::new(build_http_state(pool, upload_dir, policy));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
