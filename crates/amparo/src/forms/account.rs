//! Password reset and profile forms.

use serde::{Deserialize, Serialize};

use super::patterns::{format_phone, is_valid_email};
use super::{required, FormError, FormResult};

const RESET_CODE_LEN: usize = 6;
const MIN_PASSWORD_LEN: usize = 6;

fn email(value: &str) -> FormResult<String> {
    let email = required("email", value)?;
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(FormError::Format {
            field: "email",
            expected: "name@domain.tld",
        })
    }
}

/// First step of a password reset: where to send the code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    /// Account email.
    pub email: String,
}

impl PasswordResetRequest {
    /// Validate and return the trimmed address.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Required`] or [`FormError::Format`].
    pub fn validate(&self) -> FormResult<String> {
        email(&self.email)
    }
}

/// Second step of a password reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordReset {
    /// Code received by email.
    pub code: String,
    /// New password.
    pub password: String,
    /// New password, again.
    pub confirmation: String,
}

impl PasswordReset {
    /// Check the code and the new password.
    ///
    /// Passwords are not trimmed.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] for the first rule the input breaks.
    pub fn validate(&self) -> FormResult<()> {
        let code = required("verification code", &self.code)?;
        if code.chars().count() != RESET_CODE_LEN {
            return Err(FormError::ExactLength {
                field: "verification code",
                expected: RESET_CODE_LEN,
            });
        }
        if self.password.is_empty() {
            return Err(FormError::Required {
                field: "new password",
            });
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::TooShort {
                field: "new password",
                min: MIN_PASSWORD_LEN,
                unit: "characters",
            });
        }
        if self.password != self.confirmation {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Caregiver profile edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
}

/// A validated caregiver profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Masked phone.
    pub phone: String,
}

impl ProfileForm {
    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Required`] for the first blank field.
    pub fn validate(&self) -> FormResult<Profile> {
        let name = required("full name", &self.name)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?;
        Ok(Profile {
            name,
            email,
            phone: format_phone(&phone),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_request() {
        let request = PasswordResetRequest {
            email: " ana@example.com ".to_string(),
        };
        assert_eq!(request.validate().unwrap(), "ana@example.com");

        let request = PasswordResetRequest {
            email: "ana@example".to_string(),
        };
        assert!(matches!(
            request.validate(),
            Err(FormError::Format { field: "email", .. })
        ));

        assert_eq!(
            PasswordResetRequest::default().validate(),
            Err(FormError::Required { field: "email" })
        );
    }

    fn reset(code: &str, password: &str, confirmation: &str) -> PasswordReset {
        PasswordReset {
            code: code.to_string(),
            password: password.to_string(),
            confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_reset_rules() {
        assert_eq!(reset("123456", "secret", "secret").validate(), Ok(()));
        assert!(matches!(
            reset("12345", "secret", "secret").validate(),
            Err(FormError::ExactLength { .. })
        ));
        assert_eq!(
            reset("123456", "", "").validate(),
            Err(FormError::Required {
                field: "new password"
            })
        );
        assert!(matches!(
            reset("123456", "short", "short").validate(),
            Err(FormError::TooShort { min: 6, .. })
        ));
        assert_eq!(
            reset("123456", "secret", "secreT").validate(),
            Err(FormError::PasswordMismatch)
        );
    }

    #[test]
    fn test_profile() {
        let form = ProfileForm {
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: "1134567890".to_string(),
        };
        let profile = form.validate().unwrap();
        assert_eq!(profile.phone, "(11) 3456-7890");

        let form = ProfileForm {
            phone: " ".to_string(),
            ..form
        };
        assert_eq!(form.validate(), Err(FormError::Required { field: "phone" }));
    }
}
