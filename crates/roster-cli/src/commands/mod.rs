//! Command implementations for roster-cli

pub mod list;
pub mod locations;
pub mod record;

pub use list::run_list;
pub use locations::run_locations;
pub use record::{run_add, run_delete, run_edit};
