//! Blog post data model.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::slug::is_valid_slug;
use super::user::UserId;

/// Maximum length of a post title.
pub const TITLE_MAX: usize = 255;
/// Maximum length of a post slug.
pub const SLUG_MAX: usize = 255;

/// Validation errors returned by [`PostDraft::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Title was missing or blank once trimmed.
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX`] characters.
    TitleTooLong {
        /// The enforced maximum.
        max: usize,
    },
    /// Slug was missing, malformed, or too long.
    InvalidSlug,
    /// Content was missing or blank once trimmed.
    EmptyContent,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::InvalidSlug => write!(
                f,
                "slug must be lowercase letters, digits, and hyphens, at most {SLUG_MAX} characters",
            ),
            Self::EmptyContent => write!(f, "content must not be empty"),
        }
    }
}

impl std::error::Error for PostValidationError {}

impl PostValidationError {
    /// The offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::InvalidSlug => "slug",
            Self::EmptyContent => "content",
        }
    }
}

/// Stable post identifier assigned by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i32);

impl PostId {
    /// Wrap a storage-assigned identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw integer identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated writable fields of a post, used for create and update alike.
///
/// ## Invariants
/// - `title` and `content` are non-empty once trimmed.
/// - `slug` satisfies the slug predicate and the length bound; uniqueness is
///   enforced by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    slug: String,
    content: String,
}

impl PostDraft {
    /// Validate and construct draft fields from raw string inputs.
    pub fn new(title: &str, slug: &str, content: &str) -> Result<Self, PostValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }

        if !is_valid_slug(slug) || slug.chars().count() > SLUG_MAX {
            return Err(PostValidationError::InvalidSlug);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }

        Ok(Self {
            title: title.to_owned(),
            slug: slug.to_owned(),
            content: content.to_owned(),
        })
    }

    /// Post title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// URL-safe identifier; unique among posts.
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Post body.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Stored post aggregate.
///
/// ## Invariants
/// - `id` and `date_posted` are assigned at creation and never change.
/// - `author` references the user who created the post; only that user may
///   modify or delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    draft: PostDraft,
    author: UserId,
    date_posted: NaiveDateTime,
}

impl Post {
    /// Assemble a post from validated parts.
    ///
    /// Used by persistence adapters rehydrating stored rows and by tests.
    #[must_use]
    pub fn new(id: PostId, draft: PostDraft, author: UserId, date_posted: NaiveDateTime) -> Self {
        Self {
            id,
            draft,
            author,
            date_posted,
        }
    }

    /// Storage-assigned identifier.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Post title.
    pub fn title(&self) -> &str {
        self.draft.title()
    }

    /// URL-safe identifier.
    pub fn slug(&self) -> &str {
        self.draft.slug()
    }

    /// Post body.
    pub fn content(&self) -> &str {
        self.draft.content()
    }

    /// Owning author.
    pub fn author(&self) -> UserId {
        self.author
    }

    /// Creation timestamp, immutable once assigned.
    pub fn date_posted(&self) -> NaiveDateTime {
        self.date_posted
    }
}
