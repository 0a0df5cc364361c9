//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// Usernames and emails carry unique indexes; those indexes are the
    /// authoritative duplicate signal for registration.
    users (id) {
        /// Primary key, assigned by SQLite.
        id -> Integer,
        /// Unique login name.
        username -> Text,
        /// Display name.
        name -> Text,
        /// Unique email address.
        email -> Text,
        /// Optional favourite colour.
        favorite_color -> Nullable<Text>,
        /// Optional free-text biography.
        about_author -> Nullable<Text>,
        /// Argon2 PHC string; plaintext is never stored.
        password_hash -> Text,
        /// Whether the account holds the admin role.
        is_admin -> Bool,
        /// Stored filename of the uploaded profile picture.
        profile_picture -> Nullable<Text>,
        /// Record creation timestamp.
        date_added -> Timestamp,
    }
}

diesel::table! {
    /// Blog posts table.
    ///
    /// Slugs carry a unique index. `author_id` references `users.id` and
    /// blocks deletion of authors with surviving posts.
    posts (id) {
        /// Primary key, assigned by SQLite.
        id -> Integer,
        /// Post title.
        title -> Text,
        /// Unique URL-safe identifier.
        slug -> Text,
        /// Post body.
        content -> Text,
        /// Owning user.
        author_id -> Integer,
        /// Record creation timestamp.
        date_posted -> Timestamp,
    }
}

diesel::joinable!(posts -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(posts, users);
