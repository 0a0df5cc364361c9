//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod posts;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;

pub use error::ApiResult;
