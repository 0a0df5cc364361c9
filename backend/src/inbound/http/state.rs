//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without a real
//! server process.

use std::sync::Arc;

use crate::domain::ports::ProfilePictureStore;
use crate::domain::{Actor, AuthService, Error, ErrorCode, PostService, User, UserService};

use super::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential authentication.
    pub auth: Arc<AuthService>,
    /// User directory operations.
    pub users: Arc<UserService>,
    /// Post operations.
    pub posts: Arc<PostService>,
    /// Profile picture storage.
    pub pictures: Arc<dyn ProfilePictureStore>,
}

impl HttpState {
    /// Resolve the session's user record, if a valid session exists.
    ///
    /// A session naming a user that no longer exists is treated as absent
    /// rather than an error, so deleted accounts degrade to logged-out.
    pub(crate) async fn current_user(
        &self,
        session: &SessionContext,
    ) -> Result<Option<User>, Error> {
        let Some(id) = session.user_id()? else {
            return Ok(None);
        };
        match self.users.get(id).await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Require an authenticated actor or return `401 Unauthorized`.
    pub(crate) async fn require_actor(&self, session: &SessionContext) -> Result<Actor, Error> {
        session.require_user_id()?;
        self.current_user(session)
            .await?
            .map(|user| Actor::from_user(&user))
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}
