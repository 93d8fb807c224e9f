//! Field validation shared by every resource model.
//!
//! # Invariants
//! - Validation runs before any persistence or verification flag comparison.
//! - Errors always name the offending field.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ]{7,15}$").expect("valid phone regex"));

/// Rejected field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty after trim.
    Blank(&'static str),
    /// Value does not match the expected shape.
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
    /// Numeric value outside the accepted closed range.
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        actual: i64,
    },
    /// Two fields contradict each other.
    Inconsistent {
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    /// Name of the rejected field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank(field) => field,
            Self::InvalidFormat { field, .. } => field,
            Self::OutOfRange { field, .. } => field,
            Self::Inconsistent { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidFormat { field, expected } => {
                write!(f, "`{field}` has invalid format, expected {expected}")
            }
            Self::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "`{field}` must be within {min}..={max}, got {actual}"),
            Self::Inconsistent { field, reason } => write!(f, "`{field}` {reason}"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub(crate) fn require_text(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

pub(crate) fn require_email(field: &'static str, value: &str) -> ValidationResult {
    require_text(field, value)?;
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidFormat {
            field,
            expected: "an email address",
        });
    }
    Ok(())
}

pub(crate) fn require_phone(field: &'static str, value: &str) -> ValidationResult {
    require_text(field, value)?;
    if !PHONE_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidFormat {
            field,
            expected: "7 to 15 digits with optional leading +",
        });
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` with a plausible month/day.
pub(crate) fn require_iso_date(field: &'static str, value: &str) -> ValidationResult {
    let invalid = ValidationError::InvalidFormat {
        field,
        expected: "a YYYY-MM-DD date",
    };
    let Some(caps) = ISO_DATE_RE.captures(value) else {
        return Err(invalid);
    };
    let month: u32 = caps[2].parse().map_err(|_| invalid.clone())?;
    let day: u32 = caps[3].parse().map_err(|_| invalid.clone())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid);
    }
    Ok(())
}

pub(crate) fn require_document_number(field: &'static str, value: &str) -> ValidationResult {
    require_text(field, value)?;
    if !DIGITS_RE.is_match(value) || !(5..=15).contains(&value.len()) {
        return Err(ValidationError::InvalidFormat {
            field,
            expected: "5 to 15 digits",
        });
    }
    Ok(())
}

pub(crate) fn require_range(field: &'static str, value: i64, min: i64, max: i64) -> ValidationResult {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            actual: value,
        });
    }
    Ok(())
}

/// Both dates must already be valid ISO dates; lexical order matches calendar order.
pub(crate) fn require_date_order(
    field: &'static str,
    start: &str,
    end: &str,
) -> ValidationResult {
    if start > end {
        return Err(ValidationError::Inconsistent {
            field,
            reason: "must not be earlier than the start date",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        require_document_number, require_email, require_iso_date, require_phone, require_range,
        require_text, ValidationError,
    };

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            require_text("first_name", "   "),
            Err(ValidationError::Blank("first_name"))
        );
        assert!(require_text("first_name", "Ana").is_ok());
    }

    #[test]
    fn email_requires_domain() {
        assert!(require_email("email", "ana@example.edu.co").is_ok());
        let err = require_email("email", "ana@localhost").unwrap_err();
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn dates_reject_impossible_months() {
        assert!(require_iso_date("birth_date", "2010-02-28").is_ok());
        assert!(require_iso_date("birth_date", "2010-13-01").is_err());
        assert!(require_iso_date("birth_date", "10/02/2010").is_err());
    }

    #[test]
    fn document_numbers_are_digits_only() {
        assert!(require_document_number("document_number", "1002003004").is_ok());
        assert!(require_document_number("document_number", "10-02").is_err());
        assert!(require_document_number("document_number", "1234").is_err());
    }

    #[test]
    fn phone_allows_country_prefix() {
        assert!(require_phone("phone", "+57 3001234567").is_ok());
        assert!(require_phone("phone", "call me").is_err());
    }

    #[test]
    fn range_reports_bounds() {
        let err = require_range("grade", 12, 6, 11).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "grade",
                min: 6,
                max: 11,
                actual: 12
            }
        );
    }
}
