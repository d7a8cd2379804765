//! Record model for Roster
//!
//! This crate holds the pieces of the student registration system that have
//! no I/O of their own:
//!
//! - **Records**: [`StudentRecord`], the persisted entity, and [`Field`], the
//!   editable field names used by the form layer
//! - **Location reference data**: [`LocationHierarchy`], the static
//!   country → state → city table behind the cascading pickers
//! - **Validation**: [`validate`], the submit-time gate for a draft record
//!
//! # Example
//!
//! ```
//! use roster_model::{PaymentMode, StudentRecord, validate};
//!
//! let mut draft = StudentRecord::default();
//! draft.name = "Asha".to_string();
//! draft.mobile = "9876543210".to_string();
//! draft.payment = Some(PaymentMode::Cash);
//!
//! assert!(validate(&draft).is_ok());
//! ```

pub mod error;
pub mod location;
pub mod record;
pub mod validation;

pub use error::{Error, Result};
pub use location::{LocationHierarchy, LookupError};
pub use record::{Draft, Field, PaymentMode, StudentRecord};
pub use validation::{ValidationFailure, validate};
