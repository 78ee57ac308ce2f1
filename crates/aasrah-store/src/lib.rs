//! # aasrah-store
//!
//! Local persistent storage for the Aasrah client, backed by SQLite.
//!
//! The `local_storage` table plays the part of the browser's persistent
//! key/value storage: it holds the session cache entry and, for the demo
//! backend, the local-only report list. The crate also carries the rest of
//! the demo backend (local accounts and an image directory) so the client
//! can run without any hosted service.

pub mod accounts;
pub mod blobs;
pub mod database;
pub mod demo_reports;
pub mod local_storage;
pub mod migrations;
pub mod session;

mod error;

pub use accounts::LocalAuth;
pub use blobs::LocalObjectStore;
pub use database::{Database, SharedDatabase};
pub use demo_reports::DemoReportStore;
pub use error::StoreError;
pub use local_storage::LocalStorage;
pub use session::{SessionCache, SessionState};
