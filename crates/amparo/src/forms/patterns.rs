//! Shared field patterns and input masks.

use std::sync::OnceLock;

use regex::Regex;

/// Anything, an `@`, anything, a dot, anything; no whitespace.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// `DD/MM/YYYY`
const DATE_PATTERN: &str = r"^\d{2}/\d{2}/\d{4}$";

/// 24-hour `HH:MM`
const TIME_PATTERN: &str = r"^([01]\d|2[0-3]):[0-5]\d$";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern"))
}

/// Check an email address against the form rule.
///
/// # Panics
///
/// Never in practice; the pattern is a constant.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, EMAIL_PATTERN).is_match(email)
}

pub(super) fn is_date_shaped(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, DATE_PATTERN).is_match(value)
}

pub(super) fn is_time_shaped(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, TIME_PATTERN).is_match(value)
}

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Mask raw keyboard input as `DD/MM/YYYY`, progressively.
///
/// Non-digits are dropped and at most eight digits are kept.
#[must_use]
pub fn format_birth_date(input: &str) -> String {
    let numbers = digits(input);
    match numbers.len() {
        0..=2 => numbers,
        3..=4 => format!("{}/{}", &numbers[..2], &numbers[2..]),
        n => format!(
            "{}/{}/{}",
            &numbers[..2],
            &numbers[2..4],
            &numbers[4..n.min(8)]
        ),
    }
}

/// Mask a Brazilian phone number.
///
/// Ten digits become `(DD) DDDD-DDDD` and eleven become `(DD) DDDDD-DDDD`.
/// Shorter input is returned as bare digits; digits beyond eleven are kept
/// after the mask.
#[must_use]
pub fn format_phone(input: &str) -> String {
    let numbers = digits(input);
    let prefix = match numbers.len() {
        10 => 4,
        n if n >= 11 => 5,
        _ => return numbers,
    };
    let line_start = 2 + prefix;
    let line_end = line_start + 4;
    format!(
        "({}) {}-{}{}",
        &numbers[..2],
        &numbers[2..line_start],
        &numbers[line_start..line_end],
        &numbers[line_end..]
    )
}

/// Count the ASCII digits in a string.
pub(super) fn digit_count(input: &str) -> usize {
    input.chars().filter(char::is_ascii_digit).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@mail.co.uk"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_date_shape() {
        assert!(is_date_shaped("01/02/1950"));
        assert!(!is_date_shaped("1/2/1950"));
        assert!(!is_date_shaped("01-02-1950"));
        assert!(!is_date_shaped("01/02/50"));
    }

    #[test]
    fn test_time_shape() {
        assert!(is_time_shaped("08:00"));
        assert!(is_time_shaped("23:59"));
        assert!(!is_time_shaped("24:00"));
        assert!(!is_time_shaped("8:00"));
        assert!(!is_time_shaped("12:60"));
    }

    #[test]
    fn test_format_birth_date_progressive() {
        assert_eq!(format_birth_date(""), "");
        assert_eq!(format_birth_date("0"), "0");
        assert_eq!(format_birth_date("01"), "01");
        assert_eq!(format_birth_date("010"), "01/0");
        assert_eq!(format_birth_date("0102"), "01/02");
        assert_eq!(format_birth_date("01021"), "01/02/1");
        assert_eq!(format_birth_date("01021950"), "01/02/1950");
    }

    #[test]
    fn test_format_birth_date_strips_and_truncates() {
        assert_eq!(format_birth_date("01/02/1950"), "01/02/1950");
        assert_eq!(format_birth_date("0102195099"), "01/02/1950");
        assert_eq!(format_birth_date("ab01cd"), "01");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("1134567890"), "(11) 3456-7890");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("119876543210"), "(11) 98765-43210");
        assert_eq!(format_phone("12345"), "12345");
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count("(11) 98765-4321"), 11);
        assert_eq!(digit_count("no digits"), 0);
    }
}
