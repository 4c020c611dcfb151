//! Core types and storage for the scheduler backend.
//!
//! This crate provides everything the HTTP server needs to persist events:
//! - `Event`, `EventData` and `EventRole` for the event model
//! - `protocol` module for the action tags the scheduler UI expects
//! - `db` module for the SQLite pool, schema migrations and raw statements
//! - `EventStore`, which implements recurring-series consistency on top of `db`

pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod protocol;
pub mod store;
pub mod utils;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use event::*;
pub use protocol::{Action, ActionResponse};
pub use store::EventStore;
