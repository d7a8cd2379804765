//! Live synchronization with a remote keyed store
//!
//! This crate sits between the form/list layer and the document store:
//!
//! - [`RemoteStore`]: the operations the application needs from a remote
//!   keyed store (key generation, write/patch/erase, change watching)
//! - [`LocalStore`]: an in-process implementation, optionally persisted to a
//!   JSON file
//! - [`RemoteSyncClient`]: create/update/delete of student records and a
//!   subscription to full snapshots of the collection
//!
//! ```text
//!   FormStateController / ListViewModel
//!                   |
//!           RemoteSyncClient
//!                   |
//!          dyn RemoteStore (LocalStore, ...)
//! ```

pub mod client;
pub mod error;
pub mod store;

pub use client::{DEFAULT_COLLECTION, RemoteSyncClient, Subscription, decode_snapshot};
pub use error::{Error, Result, StoreError, StoreResult, WriteOp};
pub use store::{
    Documents, ListenerHandle, LocalStore, RemoteStore, Snapshot, StorePath, WatchCallback,
};
