//! Submit-time validation of a draft record
//!
//! Rules are checked in order and the first failure wins. Validation never
//! mutates the draft and can be called any number of times.

use crate::record::StudentRecord;

/// Why a draft cannot be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Name, mobile or payment mode is empty
    #[error("required fields missing")]
    RequiredFieldsMissing,

    /// Fees were entered without a payment date
    #[error("date required when fees > 0")]
    DateRequired,
}

impl ValidationFailure {
    /// Message shown to the user in the blocking notification
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationFailure::RequiredFieldsMissing => {
                "Name, Mobile No, and Payment Mode are required."
            }
            ValidationFailure::DateRequired => "Date is required when Fees > 0.",
        }
    }
}

/// Check whether a draft may be submitted
pub fn validate(draft: &StudentRecord) -> Result<(), ValidationFailure> {
    if draft.name.is_empty() || draft.mobile.is_empty() || draft.payment.is_none() {
        return Err(ValidationFailure::RequiredFieldsMissing);
    }
    if draft.has_fees() && draft.date.is_empty() {
        return Err(ValidationFailure::DateRequired);
    }
    Ok(())
}
