//! Input rules for the registration and account forms.
//!
//! Each form validates its fields in a fixed order and reports the first
//! failure as a [`FormError`]. A form that passes produces a typed record
//! with trimmed text and parsed dates and times.
//!
//! - **Elderly registration**: name, birth date (`DD/MM/YYYY`, age 0 to 150),
//!   six-character watch code, emergency phone with at least ten digits.
//! - **Locations**: name, address, person, category, schedule, days.
//! - **Reminders**: title, description, person, time, frequency.
//! - **Account**: password reset and profile edits.
//!
//! # Example
//!
//! ```
//! use amparo::forms::{format_birth_date, format_phone};
//!
//! assert_eq!(format_birth_date("01021950"), "01/02/1950");
//! assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
//! ```

mod account;
mod elderly;
mod location;
mod patterns;
mod reminder;

use thiserror::Error;

pub use account::{PasswordReset, PasswordResetRequest, Profile, ProfileForm};
pub use elderly::{calculate_age, ElderlyForm, ElderlyProfile, MAX_AGE, WATCH_CODE_LEN};
pub use location::{Location, LocationCategory, LocationForm};
pub use patterns::{format_birth_date, format_phone, is_valid_email};
pub use reminder::{weekday_from_index, Frequency, Reminder, ReminderForm};

/// The first rule a form submission broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A required field was empty or whitespace.
    #[error("{field} is required")]
    Required {
        /// Field name.
        field: &'static str,
    },

    /// A field did not match its expected shape.
    #[error("{field} must use the {expected} format")]
    Format {
        /// Field name.
        field: &'static str,
        /// Human-readable expected format.
        expected: &'static str,
    },

    /// The birth date does not exist on the calendar.
    #[error("birth date is not a valid date")]
    InvalidDate,

    /// The birth date lies after today.
    #[error("birth date cannot be in the future")]
    FutureDate,

    /// The computed age is implausible.
    #[error("age {age} is outside the accepted range")]
    AgeOutOfRange {
        /// Computed age in years.
        age: i32,
    },

    /// A field must have an exact length.
    #[error("{field} must have exactly {expected} characters")]
    ExactLength {
        /// Field name.
        field: &'static str,
        /// Required length.
        expected: usize,
    },

    /// A field is shorter than allowed.
    #[error("{field} must have at least {min} {unit}")]
    TooShort {
        /// Field name.
        field: &'static str,
        /// Minimum count.
        min: usize,
        /// What is being counted.
        unit: &'static str,
    },

    /// A numeric field is outside its range.
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: u32,
    },

    /// A multi-select had nothing selected.
    #[error("select at least one {what}")]
    NothingSelected {
        /// What should have been selected.
        what: &'static str,
    },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Result of validating a form.
pub type FormResult<T> = std::result::Result<T, FormError>;

/// Trim a required field, rejecting blank input.
fn required(field: &'static str, value: &str) -> FormResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Required { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim an optional free-text field, mapping blank input to `None`.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
