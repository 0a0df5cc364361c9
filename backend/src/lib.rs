//! Blog backend library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the pure model
//! and services, [`inbound`] the HTTP adapter, and [`outbound`] the SQLite
//! and filesystem adapters.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::Trace;
