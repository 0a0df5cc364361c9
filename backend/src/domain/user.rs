//! User data model: identifiers, validated profile fields, and the stored
//! user aggregate.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::password::PasswordHash;

/// Maximum length of a user's display name.
pub const NAME_MAX: usize = 200;
/// Maximum length of a user's email address.
pub const EMAIL_MAX: usize = 120;
/// Maximum length of a username.
pub const USERNAME_MAX: usize = 20;
/// Maximum length of the favourite colour field.
pub const FAVORITE_COLOR_MAX: usize = 120;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 6;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 16;

/// Validation errors returned by [`Profile::new`] and [`Registration::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Name exceeded [`NAME_MAX`] characters.
    NameTooLong {
        /// The enforced maximum.
        max: usize,
    },
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email exceeded [`EMAIL_MAX`] characters.
    EmailTooLong {
        /// The enforced maximum.
        max: usize,
    },
    /// Email did not look like an address.
    InvalidEmail,
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Username exceeded [`USERNAME_MAX`] characters.
    UsernameTooLong {
        /// The enforced maximum.
        max: usize,
    },
    /// Favourite colour exceeded [`FAVORITE_COLOR_MAX`] characters.
    FavoriteColorTooLong {
        /// The enforced maximum.
        max: usize,
    },
    /// Password fell outside the accepted length range.
    PasswordLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Password and its confirmation differed.
    PasswordMismatch,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::FavoriteColorTooLong { max } => {
                write!(f, "favourite colour must be at most {max} characters")
            }
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords must match"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Field name associated with a [`UserValidationError`], for structured
/// error details at the boundary.
impl UserValidationError {
    /// The offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::InvalidEmail => "email",
            Self::EmptyUsername | Self::UsernameTooLong { .. } => "username",
            Self::FavoriteColorTooLong { .. } => "favoriteColor",
            Self::PasswordLength { .. } | Self::PasswordMismatch => "password",
        }
    }
}

/// Stable user identifier assigned by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Syntactic check only; deliverability is not a domain concern.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated self-service profile fields shared by registration and update.
///
/// ## Invariants
/// - `name`, `email`, and `username` are trimmed, non-empty, and within
///   their length bounds; `email` is syntactically valid.
/// - Optional fields are stored trimmed; blank input collapses to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    email: String,
    username: String,
    favorite_color: Option<String>,
    about_author: Option<String>,
}

impl Profile {
    /// Validate and construct profile fields from raw string inputs.
    pub fn new(
        name: &str,
        email: &str,
        username: &str,
        favorite_color: Option<&str>,
        about_author: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }

        let email = email.trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(email) {
            return Err(UserValidationError::InvalidEmail);
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }

        let favorite_color = normalize_optional(favorite_color);
        if let Some(color) = &favorite_color
            && color.chars().count() > FAVORITE_COLOR_MAX
        {
            return Err(UserValidationError::FavoriteColorTooLong {
                max: FAVORITE_COLOR_MAX,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            username: username.to_owned(),
            favorite_color,
            about_author: normalize_optional(about_author),
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address as stored; lookups are exact-match.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Unique username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Favourite colour, if given.
    pub fn favorite_color(&self) -> Option<&str> {
        self.favorite_color.as_deref()
    }

    /// Free-text author biography, if given.
    pub fn about_author(&self) -> Option<&str> {
        self.about_author.as_deref()
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Validated registration input: profile fields plus a confirmed password.
///
/// The plaintext password lives in a zeroized buffer and is only readable by
/// the registration flow that derives its hash.
#[derive(Debug, Clone)]
pub struct Registration {
    profile: Profile,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate the password pair and bind it to already-validated profile
    /// fields.
    pub fn new(
        profile: Profile,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, UserValidationError> {
        let length = password.chars().count();
        if length < PASSWORD_MIN || length > PASSWORD_MAX {
            return Err(UserValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        if password != confirmation {
            return Err(UserValidationError::PasswordMismatch);
        }
        Ok(Self {
            profile,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// The validated profile fields.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The plaintext password, for hash derivation only.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Stored user aggregate.
///
/// ## Invariants
/// - `id` and `date_added` are assigned at creation and never change.
/// - `username` and `email` are globally unique among users.
/// - The password is only held as a salted [`PasswordHash`].
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    profile: Profile,
    password_hash: PasswordHash,
    is_admin: bool,
    profile_picture: Option<String>,
    date_added: NaiveDateTime,
}

impl User {
    /// Assemble a user from validated parts.
    ///
    /// Used by persistence adapters rehydrating stored rows and by tests.
    #[must_use]
    pub fn new(
        id: UserId,
        profile: Profile,
        password_hash: PasswordHash,
        is_admin: bool,
        profile_picture: Option<String>,
        date_added: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            profile,
            password_hash,
            is_admin,
            profile_picture,
            date_added,
        }
    }

    /// Storage-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Validated profile fields.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Unique username.
    pub fn username(&self) -> &str {
        self.profile.username()
    }

    /// Email address.
    pub fn email(&self) -> &str {
        self.profile.email()
    }

    /// Salted password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Whether this user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Stored filename of the uploaded profile picture, if any.
    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    /// Creation timestamp, immutable once assigned.
    pub fn date_added(&self) -> NaiveDateTime {
        self.date_added
    }
}
