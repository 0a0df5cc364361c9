//! Shared fixtures for handler tests.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

/// Cookie-session middleware for in-process handler tests.
///
/// Uses a throwaway key and a plain-HTTP cookie so each test app stands
/// alone. Production wiring lives in the server module.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    let key = Key::generate();
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}
