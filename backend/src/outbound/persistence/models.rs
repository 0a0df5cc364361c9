//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{PasswordHash, Post, PostDraft, PostId, Profile, User, UserId};

use super::schema::{posts, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub favorite_color: Option<String>,
    pub about_author: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub date_added: NaiveDateTime,
}

impl UserRow {
    /// Rehydrate the domain aggregate from a stored row.
    ///
    /// Stored rows were validated on the way in; a row that no longer
    /// satisfies profile validation indicates out-of-band tampering and is
    /// reported as a query failure rather than a panic.
    pub(crate) fn into_domain(self) -> Result<User, UserPersistenceError> {
        let profile = Profile::new(
            &self.name,
            &self.email,
            &self.username,
            self.favorite_color.as_deref(),
            self.about_author.as_deref(),
        )
        .map_err(|err| {
            UserPersistenceError::query(format!("stored user {} is invalid: {err}", self.id))
        })?;
        Ok(User::new(
            UserId::new(self.id),
            profile,
            PasswordHash::from_stored(self.password_hash),
            self.is_admin,
            self.profile_picture,
            self.date_added,
        ))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub favorite_color: Option<&'a str>,
    pub about_author: Option<&'a str>,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub date_added: NaiveDateTime,
}

/// Changeset struct for the self-service profile fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileChangeset<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub favorite_color: Option<Option<&'a str>>,
    pub about_author: Option<Option<&'a str>>,
}

impl<'a> ProfileChangeset<'a> {
    /// Build a changeset that overwrites every profile field, clearing
    /// optional columns the profile no longer carries.
    pub(crate) fn from_profile(profile: &'a Profile) -> Self {
        Self {
            username: profile.username(),
            name: profile.name(),
            email: profile.email(),
            favorite_color: Some(profile.favorite_color()),
            about_author: Some(profile.about_author()),
        }
    }
}

/// Row struct for reading from the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PostRow {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: i32,
    pub date_posted: NaiveDateTime,
}

impl PostRow {
    /// Rehydrate the domain aggregate from a stored row.
    pub(crate) fn into_domain(self) -> Result<Post, crate::domain::ports::PostPersistenceError> {
        let draft = PostDraft::new(&self.title, &self.slug, &self.content).map_err(|err| {
            crate::domain::ports::PostPersistenceError::query(format!(
                "stored post {} is invalid: {err}",
                self.id
            ))
        })?;
        Ok(Post::new(
            PostId::new(self.id),
            draft,
            UserId::new(self.author_id),
            self.date_posted,
        ))
    }
}

/// Insertable struct for creating new post records.
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub author_id: i32,
    pub date_posted: NaiveDateTime,
}

/// Changeset struct for the writable post fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = posts)]
pub(crate) struct PostChangeset<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
}

impl<'a> PostChangeset<'a> {
    pub(crate) fn from_draft(draft: &'a PostDraft) -> Self {
        Self {
            title: draft.title(),
            slug: draft.slug(),
            content: draft.content(),
        }
    }
}
