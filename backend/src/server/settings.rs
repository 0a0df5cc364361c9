//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `BLOG_`-prefixed environment variables, or a
//! configuration file, in that order of precedence. Every field is optional
//! with the default supplied by an accessor.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use backend::domain::UserDeletionPolicy;

const DEFAULT_DATABASE_URL: &str = "blog.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "static/images";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Configuration values for the blog backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct AppSettings {
    /// Path of the SQLite database file.
    pub database_url: Option<String>,
    /// Socket address to bind the HTTP listener to.
    pub bind_addr: Option<String>,
    /// Directory profile pictures are written to.
    pub upload_dir: Option<PathBuf>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` flag.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Who may delete user accounts: `self-or-admin`, `admin-only`, or
    /// `unrestricted`.
    pub user_deletion_policy: Option<String>,
}

impl AppSettings {
    /// SQLite database path, defaulting to a file in the working directory.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Bind address for the HTTP listener.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Upload directory for profile pictures.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Session key file path.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Parsed user-deletion policy, falling back to the default on unknown
    /// values with a warning rather than refusing to start.
    pub fn user_deletion_policy(&self) -> UserDeletionPolicy {
        match self.user_deletion_policy.as_deref() {
            None => UserDeletionPolicy::default(),
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%err, "falling back to the default user deletion policy");
                UserDeletionPolicy::default()
            }),
        }
    }
}
