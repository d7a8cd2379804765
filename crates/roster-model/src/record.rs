//! Student records and their editable fields

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum number of digits accepted for a mobile number
pub const MOBILE_MAX_LEN: usize = 10;

/// Date format used for the `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fees value meaning "nothing paid"
pub const NO_FEES: &str = "0";

/// How a fee payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMode {
    Cash,
    Upi,
    Cheque,
}

impl PaymentMode {
    /// All payment modes, in display order
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Cash, PaymentMode::Upi, PaymentMode::Cheque];

    /// Stored name of the payment mode
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Upi => "UPI",
            PaymentMode::Cheque => "Cheque",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::invalid_value(
                    Field::Payment,
                    format!("'{}' is not one of Cash, UPI, Cheque", s),
                )
            })
    }
}

/// A student registration as stored in the remote collection
///
/// Every field except `id` and `payment` is kept as the string the user
/// entered, which is also how the record is stored remotely. Missing fields
/// in a stored document fall back to the defaults of a new registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    /// Store-assigned key; `None` until the record is first saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub fees: String,
    /// Payment date, `YYYY-MM-DD`
    pub date: String,
    #[serde(with = "payment_field")]
    pub payment: Option<PaymentMode>,
    pub country: String,
    pub state: String,
    pub city: String,
}

/// The in-progress working copy held by the form
pub type Draft = StudentRecord;

impl Default for StudentRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            mobile: String::new(),
            email: String::new(),
            address: String::new(),
            fees: NO_FEES.to_string(),
            date: String::new(),
            payment: None,
            country: String::new(),
            state: String::new(),
            city: String::new(),
        }
    }
}

impl StudentRecord {
    /// Whether a fee amount other than `"0"` has been entered
    pub fn has_fees(&self) -> bool {
        self.fees != NO_FEES
    }

    /// Current value of a field in its stored string form
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Mobile => &self.mobile,
            Field::Email => &self.email,
            Field::Address => &self.address,
            Field::Fees => &self.fees,
            Field::Date => &self.date,
            Field::Payment => self.payment.map(|p| p.as_str()).unwrap_or(""),
            Field::Country => &self.country,
            Field::State => &self.state,
            Field::City => &self.city,
        }
    }

    /// Store a value that has already passed [`Field::check`]
    ///
    /// No cascading is applied here; callers that edit location fields are
    /// responsible for clearing dependent fields.
    pub fn put(&mut self, field: Field, value: &str) -> Result<()> {
        let value = value.to_string();
        match field {
            Field::Name => self.name = value,
            Field::Mobile => self.mobile = value,
            Field::Email => self.email = value,
            Field::Address => self.address = value,
            Field::Fees => self.fees = value,
            Field::Date => self.date = value,
            Field::Payment => {
                self.payment = if value.is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
            Field::Country => self.country = value,
            Field::State => self.state = value,
            Field::City => self.city = value,
        }
        Ok(())
    }
}

/// An editable field of a student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Mobile,
    Email,
    Address,
    Fees,
    Date,
    Payment,
    Country,
    State,
    City,
}

impl Field {
    /// All editable fields, in form order
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Mobile,
        Field::Email,
        Field::Address,
        Field::Fees,
        Field::Date,
        Field::Payment,
        Field::Country,
        Field::State,
        Field::City,
    ];

    /// Name of the field in stored documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Mobile => "mobile",
            Field::Email => "email",
            Field::Address => "address",
            Field::Fees => "fees",
            Field::Date => "date",
            Field::Payment => "payment",
            Field::Country => "country",
            Field::State => "state",
            Field::City => "city",
        }
    }

    /// Whether the field's valid values depend on the location hierarchy
    pub fn is_location(&self) -> bool {
        matches!(self, Field::Country | Field::State | Field::City)
    }

    /// Check a value against the input rules of this field
    ///
    /// Empty values are always accepted so a field can be cleared while
    /// editing; required fields are enforced at submit time by
    /// [`validate`](crate::validate). Location fields are checked against
    /// the hierarchy by the form layer, not here.
    pub fn check(&self, value: &str) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        match self {
            Field::Mobile => {
                if !value.chars().all(|c| c.is_ascii_digit()) {
                    return Err(Error::invalid_value(*self, "digits only"));
                }
                if value.len() > MOBILE_MAX_LEN {
                    return Err(Error::invalid_value(
                        *self,
                        format!("at most {} digits", MOBILE_MAX_LEN),
                    ));
                }
            }
            Field::Fees => {
                let mut parts = value.splitn(2, '.');
                let whole = parts.next().unwrap_or("");
                let fraction = parts.next().unwrap_or("");
                let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
                if !numeric(whole) || !numeric(fraction) || value == "." {
                    return Err(Error::invalid_value(*self, "must be a number"));
                }
            }
            Field::Date => {
                let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
                    Error::invalid_value(*self, format!("expected YYYY-MM-DD ({})", e))
                })?;
                // chrono accepts padding variations; only the canonical text is stored
                if date.format(DATE_FORMAT).to_string() != value {
                    return Err(Error::invalid_value(*self, "expected YYYY-MM-DD"));
                }
            }
            Field::Payment => {
                value.parse::<PaymentMode>()?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::UnknownField {
                name: s.to_string(),
            })
    }
}

/// Stores `payment` as its name, with `""` for "not chosen"
mod payment_field {
    use super::PaymentMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<PaymentMode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|p| p.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PaymentMode>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e: crate::Error| serde::de::Error::custom(e.to_string()))
    }
}
