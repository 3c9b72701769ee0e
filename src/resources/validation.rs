//! Client-side validation for resource payloads.

use chrono::NaiveDate;
use thiserror::Error;

/// A resource payload field failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{field} is required")]
    Required {
        /// Field name.
        field: &'static str,
    },

    /// A field is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// A date field is not a `YYYY-MM-DD` calendar date.
    #[error("{field} must be in YYYY-MM-DD format, got '{value}'")]
    InvalidDate {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A list field has too many items.
    #[error("Maximum {max} {field} allowed")]
    TooManyItems {
        /// Field name.
        field: &'static str,
        /// Maximum number of items.
        max: usize,
    },
}

pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

pub(crate) fn max_items<T>(field: &'static str, items: &[T], max: usize) -> Result<(), ValidationError> {
    if items.len() > max {
        Err(ValidationError::TooManyItems { field, max })
    } else {
        Ok(())
    }
}

/// Parses a strict `YYYY-MM-DD` date.
pub(crate) fn date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Splits a comma-separated tag input into trimmed, non-empty tags.
///
/// # Example
///
/// ```rust
/// use console_session::resources::parse_tags;
///
/// assert_eq!(parse_tags(" work, urgent ,,home"), vec!["work", "urgent", "home"]);
/// ```
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required("title", "Buy milk").is_ok());
        assert_eq!(
            required("title", "   "),
            Err(ValidationError::Required { field: "title" })
        );
    }

    #[test]
    fn test_max_chars_counts_characters() {
        assert!(max_chars("title", &"あ".repeat(100), 100).is_ok());
        assert!(max_chars("title", &"a".repeat(101), 100).is_err());
    }

    #[test]
    fn test_date_requires_strict_format() {
        assert_eq!(
            date("due_date", "2025-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
        assert!(date("due_date", "2025-1-31").is_err());
        assert!(date("due_date", "2025-02-30").is_err());
        assert!(date("due_date", "31/01/2025").is_err());
        assert!(date("due_date", "+2025-0131").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::TooManyItems {
                field: "tags",
                max: 10
            }
            .to_string(),
            "Maximum 10 tags allowed"
        );
        assert_eq!(
            ValidationError::TooLong {
                field: "description",
                max: 500
            }
            .to_string(),
            "description must be at most 500 characters"
        );
    }
}
