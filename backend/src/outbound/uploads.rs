//! Filesystem store for uploaded profile pictures.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ProfilePictureStore, UploadError};

/// Reduce an uploaded filename to a safe basename.
///
/// Any path components are stripped and characters outside
/// `[A-Za-z0-9._-]` are replaced so the result can never escape the upload
/// directory or confuse the filesystem.
fn sanitize_filename(original: &str) -> Option<String> {
    let basename = Path::new(original).file_name()?.to_str()?;
    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let meaningful = cleaned.chars().any(|c| c.is_ascii_alphanumeric());
    if meaningful { Some(cleaned) } else { None }
}

/// Stores profile pictures under a configured directory.
///
/// Each upload is written under a fresh UUID-prefixed name, so two users
/// uploading `avatar.png` never collide and re-uploads never overwrite a
/// file another record may still reference.
#[derive(Debug, Clone)]
pub struct FsProfilePictureStore {
    root: PathBuf,
}

impl FsProfilePictureStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory uploads are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ProfilePictureStore for FsProfilePictureStore {
    async fn save(&self, original_filename: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        let sanitized =
            sanitize_filename(original_filename).ok_or(UploadError::InvalidFilename)?;
        let stored_name = format!("{}_{sanitized}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| UploadError::io(err.to_string()))?;
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| UploadError::io(err.to_string()))?;

        debug!(path = %path.display(), "stored profile picture");
        Ok(stored_name)
    }
}
