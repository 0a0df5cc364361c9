//! Backend entry-point: configuration, key handling, and server startup.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{AppSettings, ServerConfig};

fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("BLOG_SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;

    let bind_addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;

    let key = load_session_key(&settings)?;

    let pool = DbPool::new(PoolConfig::new(settings.database_url()))
        .map_err(|e| std::io::Error::other(format!("database setup failed: {e}")))?;

    let policy = backend::domain::Policy::new(settings.user_deletion_policy());

    let config = ServerConfig::new(key, bind_addr, pool, settings.upload_dir())
        .with_cookie_secure(settings.cookie_secure)
        .with_policy(policy);

    info!(addr = %bind_addr, "starting blog backend");
    server::create_server(config)?.await
}
