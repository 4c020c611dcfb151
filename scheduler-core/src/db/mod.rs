//! SQLite backend for the event store.
//!
//! - [`connection`]: `r2d2` pool; every new connection gets WAL mode and a busy timeout.
//! - [`migrations`]: version-tracked schema, each migration in its own transaction.
//! - [`repository`]: one function per SQL statement, each taking `&Connection`.

pub mod connection;
pub mod migrations;
pub mod repository;

pub use connection::{ConnectionPool, open_pool};
pub use migrations::{current_version, run_migrations};
pub use repository::EventRepo;
