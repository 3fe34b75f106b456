#![warn(clippy::all, missing_docs)]

//! Core state synchronisation for the routebook client.
//!
//! This crate keeps the in-memory session and route catalog consistent with
//! the remote directory and with a durable key-value mirror. Frontends
//! dispatch intents through [`SessionStore`] and [`CatalogStore`] and render
//! whatever [`StateContainer`] currently holds.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod session;
pub mod state;
pub mod storage;
pub mod sync;

#[cfg(test)]
mod testing;

pub use catalog::{CatalogState, CatalogStore, RouteOrigin};
pub use config::{AppConfig, StorageKeys};
pub use error::{Outcome, SyncError};
pub use models::{Credentials, Route, UserRecord};
pub use remote::{Directory, DirectoryClient};
pub use session::{SessionState, SessionStore};
pub use state::{Action, AppState, StateContainer};
pub use storage::{DurableStore, FileStore, MemoryStore, StorageError};
pub use sync::{ColdStartReport, SyncCore};
