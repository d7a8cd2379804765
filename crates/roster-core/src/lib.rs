//! Form and list state for Roster
//!
//! This crate ties the record model to the sync layer:
//!
//! - **FormStateController**: owns the draft record, applies field edits with
//!   cascading resets of dependent location fields, and submits through the
//!   sync client
//! - **ListViewModel**: holds the latest snapshot of the remote collection
//!   and routes edit/delete requests
//! - **Configuration**: where the store lives and which location table to use
//!
//! # Data flow
//!
//! ```text
//! edits -> FormStateController --validate--> RemoteSyncClient.write
//!                                                   |
//!                                             remote store
//!                                                   |
//! render <- ListViewModel <-- snapshot -- RemoteSyncClient.subscribe
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod list;

pub use config::{AppConfig, LocationsConfig, StoreConfig};
pub use error::{Error, Result};
pub use form::{FormStateController, SubmitOutcome};
pub use list::{ListState, ListViewModel};
