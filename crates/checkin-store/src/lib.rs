//! # checkin-store
//!
//! Durable storage for the check-in ledger.
//!
//! The whole ledger is one JSON document mapping context ids to per-user
//! records. The crate exposes an async [`JsonStore`] handle that loads the
//! document once (migrating it from a legacy location if needed) and rewrites
//! it atomically on every save.

pub mod document;
pub mod migration;
pub mod models;

mod error;

pub use document::JsonStore;
pub use error::{Result, StoreError};
pub use models::*;
