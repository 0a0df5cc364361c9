//! Profile picture upload handler.
//!
//! ```text
//! PUT /api/v1/users/{id}/profile-picture  (multipart field "profile_pic")
//! ```

use actix_multipart::Multipart;
use actix_web::{put, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::UploadError;
use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Multipart field name carrying the image.
const PICTURE_FIELD: &str = "profile_pic";

/// Upload size cap. Pictures beyond this are rejected before any write.
const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Response body for a stored profile picture.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureResponse {
    pub profile_picture: String,
}

fn map_multipart_error(err: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart payload: {err}"))
}

fn map_upload_error(err: UploadError) -> Error {
    match err {
        UploadError::InvalidFilename => Error::invalid_request("upload filename is invalid"),
        UploadError::Io { message } => Error::internal(message),
    }
}

/// Store an uploaded profile picture and record it on the user.
///
/// Owner or admin only. The picture travels as a multipart field named
/// `profile_pic`; the stored filename replaces any previous one, though the
/// old file itself is left in place.
#[put("/users/{id}/profile-picture")]
pub async fn upload_profile_picture(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> ApiResult<web::Json<ProfilePictureResponse>> {
    let actor = state.require_actor(&session).await?;
    let user_id = UserId::new(path.into_inner());
    // Reject unauthorized or misaddressed uploads before any bytes reach
    // the store; a denied request must leave no file behind.
    state.users.authorize_profile_edit(user_id, &actor).await?;

    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let disposition = field.content_disposition();
        if disposition.get_name() != Some(PICTURE_FIELD) {
            continue;
        }
        let filename = disposition
            .get_filename()
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::invalid_request("profile picture needs a filename"))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
            if bytes.len() + chunk.len() > MAX_PICTURE_BYTES {
                return Err(Error::invalid_request(
                    "profile picture exceeds the 5 MiB limit",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(Error::invalid_request("profile picture is empty"));
        }

        let stored = state
            .pictures
            .save(&filename, bytes)
            .await
            .map_err(map_upload_error)?;
        state
            .users
            .set_profile_picture(user_id, &actor, &stored)
            .await?;
        info!(user = %user_id, file = %stored, "profile picture updated");
        return Ok(web::Json(ProfilePictureResponse {
            profile_picture: stored,
        }));
    }

    Err(Error::invalid_request(format!(
        "multipart field '{PICTURE_FIELD}' is required"
    )))
}
