//! Elderly registration form.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::patterns::{digit_count, format_phone, is_date_shaped};
use super::{optional, required, FormError, FormResult};

/// Oldest accepted age, in years.
pub const MAX_AGE: i32 = 150;

/// Characters in a watch pairing code.
pub const WATCH_CODE_LEN: usize = 6;

const MIN_PHONE_DIGITS: usize = 10;

/// Raw input from the elderly registration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElderlyForm {
    /// Full name.
    pub name: String,
    /// Birth date as typed, `DD/MM/YYYY`.
    pub birth_date: String,
    /// Pairing code printed on the watch.
    pub watch_code: String,
    /// Emergency contact phone.
    pub emergency_phone: String,
    /// Free-text health conditions.
    #[serde(default)]
    pub health_conditions: String,
    /// Free-text medications.
    #[serde(default)]
    pub medications: String,
}

/// A validated elderly profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElderlyProfile {
    /// Trimmed full name.
    pub name: String,
    /// Parsed birth date.
    pub birth_date: NaiveDate,
    /// Age in whole years on the validation day.
    pub age: i32,
    /// Watch pairing code.
    pub watch_code: String,
    /// Masked, e.g. `(11) 98765-4321`.
    pub emergency_phone: String,
    /// Health conditions, if any were given.
    pub health_conditions: Option<String>,
    /// Medications, if any were given.
    pub medications: Option<String>,
}

impl ElderlyForm {
    /// Validate the form as of `today`.
    ///
    /// Fields are checked in screen order and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] for the first rule the input breaks.
    pub fn validate(&self, today: NaiveDate) -> FormResult<ElderlyProfile> {
        let name = required("name", &self.name)?;

        let birth_text = required("birth date", &self.birth_date)?;
        if !is_date_shaped(&birth_text) {
            return Err(FormError::Format {
                field: "birth date",
                expected: "DD/MM/YYYY",
            });
        }
        let birth_date = parse_birth_date(&birth_text)?;
        if birth_date > today {
            return Err(FormError::FutureDate);
        }
        let age = calculate_age(birth_date, today);
        if !(0..=MAX_AGE).contains(&age) {
            return Err(FormError::AgeOutOfRange { age });
        }

        let watch_code = required("watch code", &self.watch_code)?;
        if watch_code.chars().count() != WATCH_CODE_LEN {
            return Err(FormError::ExactLength {
                field: "watch code",
                expected: WATCH_CODE_LEN,
            });
        }

        let phone = required("emergency phone", &self.emergency_phone)?;
        if digit_count(&phone) < MIN_PHONE_DIGITS {
            return Err(FormError::TooShort {
                field: "emergency phone",
                min: MIN_PHONE_DIGITS,
                unit: "digits",
            });
        }

        Ok(ElderlyProfile {
            name,
            birth_date,
            age,
            watch_code,
            emergency_phone: format_phone(&phone),
            health_conditions: optional(&self.health_conditions),
            medications: optional(&self.medications),
        })
    }
}

/// Parse a `DD/MM/YYYY` string that already matched the date pattern.
///
/// Calendar overflow such as `31/02/2000` is rejected rather than rolled
/// forward.
fn parse_birth_date(text: &str) -> FormResult<NaiveDate> {
    let mut parts = text.split('/').map(str::parse::<u32>);
    let (Some(Ok(day)), Some(Ok(month)), Some(Ok(year))) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FormError::InvalidDate);
    };
    let year = i32::try_from(year).map_err(|_| FormError::InvalidDate)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(FormError::InvalidDate)
}

/// Whole years between `birth` and `today`.
///
/// The count drops by one until the birthday has come around this year.
#[must_use]
pub fn calculate_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn valid() -> ElderlyForm {
        ElderlyForm {
            name: "  Maria da Silva ".to_string(),
            birth_date: "10/03/1948".to_string(),
            watch_code: "AB12CD".to_string(),
            emergency_phone: "11987654321".to_string(),
            health_conditions: "hipertensão".to_string(),
            medications: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let profile = valid().validate(today()).unwrap();
        assert_eq!(profile.name, "Maria da Silva");
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1948, 3, 10).unwrap());
        assert_eq!(profile.age, 76);
        assert_eq!(profile.emergency_phone, "(11) 98765-4321");
        assert_eq!(profile.health_conditions.as_deref(), Some("hipertensão"));
        assert_eq!(profile.medications, None);
    }

    #[test]
    fn test_first_failure_wins() {
        let form = ElderlyForm::default();
        assert_eq!(
            form.validate(today()),
            Err(FormError::Required { field: "name" })
        );

        let form = ElderlyForm {
            name: "Maria".to_string(),
            ..ElderlyForm::default()
        };
        assert_eq!(
            form.validate(today()),
            Err(FormError::Required { field: "birth date" })
        );
    }

    #[test]
    fn test_birth_date_shape() {
        let form = ElderlyForm {
            birth_date: "1948-03-10".to_string(),
            ..valid()
        };
        assert!(matches!(
            form.validate(today()),
            Err(FormError::Format { field: "birth date", .. })
        ));
    }

    #[test]
    fn test_impossible_date() {
        let form = ElderlyForm {
            birth_date: "31/02/1950".to_string(),
            ..valid()
        };
        assert_eq!(form.validate(today()), Err(FormError::InvalidDate));

        let form = ElderlyForm {
            birth_date: "10/13/1950".to_string(),
            ..valid()
        };
        assert_eq!(form.validate(today()), Err(FormError::InvalidDate));
    }

    #[test]
    fn test_future_date() {
        let form = ElderlyForm {
            birth_date: "16/06/2024".to_string(),
            ..valid()
        };
        assert_eq!(form.validate(today()), Err(FormError::FutureDate));
    }

    #[test]
    fn test_born_today_is_accepted() {
        let form = ElderlyForm {
            birth_date: "15/06/2024".to_string(),
            ..valid()
        };
        assert_eq!(form.validate(today()).unwrap().age, 0);
    }

    #[test]
    fn test_age_limit() {
        let form = ElderlyForm {
            birth_date: "15/06/1874".to_string(),
            ..valid()
        };
        assert_eq!(form.validate(today()).unwrap().age, MAX_AGE);

        let form = ElderlyForm {
            birth_date: "14/06/1873".to_string(),
            ..valid()
        };
        assert_eq!(
            form.validate(today()),
            Err(FormError::AgeOutOfRange { age: 151 })
        );
    }

    #[test]
    fn test_watch_code_length() {
        for code in ["ABC12", "ABC1234"] {
            let form = ElderlyForm {
                watch_code: code.to_string(),
                ..valid()
            };
            assert_eq!(
                form.validate(today()),
                Err(FormError::ExactLength {
                    field: "watch code",
                    expected: WATCH_CODE_LEN
                })
            );
        }
    }

    #[test]
    fn test_phone_digits() {
        let form = ElderlyForm {
            emergency_phone: "(11) 9876-543".to_string(),
            ..valid()
        };
        assert!(matches!(
            form.validate(today()),
            Err(FormError::TooShort { min: 10, .. })
        ));

        let form = ElderlyForm {
            emergency_phone: "(11) 3456-7890".to_string(),
            ..valid()
        };
        assert_eq!(
            form.validate(today()).unwrap().emergency_phone,
            "(11) 3456-7890"
        );
    }

    #[test]
    fn test_calculate_age_birthday_boundary() {
        let birth = NaiveDate::from_ymd_opt(1950, 6, 15).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(calculate_age(birth, day_before), 73);
        assert_eq!(calculate_age(birth, today()), 74);
    }
}
