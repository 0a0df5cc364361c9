//! SQLite persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by SQLite
//! via Diesel, with r2d2 connection pooling and queries executed on the
//! blocking thread pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types; unique indexes and the posts foreign key are
//!   the authoritative source of duplicate and referenced signals.

mod diesel_post_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
