//! Record validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a registry record is rejected before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `house_number` is empty after trimming.
    BlankHouseNumber,
    /// A required name part (`first_name` / `last_name`) is empty.
    BlankName(&'static str),
    /// A text field exceeds its maximum character count.
    TooLong { field: &'static str, max_chars: usize },
    /// Latitude outside `[-90, 90]` or not finite.
    LatitudeOutOfRange(f64),
    /// Longitude outside `[-180, 180]` or not finite.
    LongitudeOutOfRange(f64),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Date of birth lies after the reference date.
    BirthDateInFuture,
    /// `house_number` and `household_id` must be set or cleared together.
    HouseholdLinkMismatch,
    /// A required text field is empty after trimming.
    Required(&'static str),
    /// A closing date precedes its opening date.
    EndsBeforeStart {
        start: &'static str,
        end: &'static str,
    },
    /// Household head is not among the selected members.
    HeadNotMember,
    /// Status value not accepted for this record kind.
    UnknownValue { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankHouseNumber => write!(f, "house number is required"),
            Self::BlankName(field) => write!(f, "{field} is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::LatitudeOutOfRange(value) => write!(f, "latitude out of range: {value}"),
            Self::LongitudeOutOfRange(value) => write!(f, "longitude out of range: {value}"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::BirthDateInFuture => write!(f, "date of birth cannot be in the future"),
            Self::HouseholdLinkMismatch => {
                write!(f, "house number must mirror the household assignment")
            }
            Self::Required(field) => write!(f, "{field} is required"),
            Self::EndsBeforeStart { start, end } => write!(f, "{end} cannot be before {start}"),
            Self::HeadNotMember => {
                write!(f, "head of household must be one of the selected members")
            }
            Self::UnknownValue { field, value } => write!(f, "unknown {field} `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a required text field and rejects blank or over-long input.
pub fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    check_len(field, Some(trimmed), max_chars)?;
    Ok(trimmed.to_string())
}

/// Rejects optional text longer than `max_chars`.
pub fn check_len(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > max_chars => {
            Err(ValidationError::TooLong { field, max_chars })
        }
        _ => Ok(()),
    }
}

/// Folds a user-entered choice label (`In Progress`, `in-progress`) to its
/// stored key (`in_progress`).
pub(crate) fn choice_key(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::{check_len, choice_key, require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("title", "  Clean-up  ", 20).unwrap(), "Clean-up");
        assert_eq!(
            require_text("title", " \t", 20).unwrap_err(),
            ValidationError::Required("title")
        );
        assert!(matches!(
            require_text("title", "abcdef", 3),
            Err(ValidationError::TooLong { field: "title", max_chars: 3 })
        ));
    }

    #[test]
    fn check_len_counts_characters_not_bytes() {
        assert!(check_len("purok", Some("Niño"), 4).is_ok());
        assert!(check_len("purok", None, 0).is_ok());
    }

    #[test]
    fn choice_key_folds_labels() {
        assert_eq!(choice_key(" In Progress "), "in_progress");
        assert_eq!(choice_key("first-time job seeker"), "first_time_job_seeker");
    }
}
