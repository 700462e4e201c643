//! Records store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define household/resident data access contracts used by services.
//! - Define the civic record stores (officials through documents).
//! - Keep SQL details and row decoding inside the store boundary.
//! - Enforce session write permission on every mutating call.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Bulk membership writes touch exactly the ids they are given.

use crate::db::{classify_constraint, ConstraintViolation, DbError};
use crate::model::session::Session;
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod activity_repo;
pub mod certificate_repo;
pub mod document_repo;
pub mod household_repo;
pub mod official_repo;
pub mod ordinance_repo;
pub mod report_repo;
pub mod resident_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error shared by every registry repository.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { table: &'static str, id: Uuid },
    /// Row cannot be deleted while other rows point at it.
    Referenced { table: &'static str, id: Uuid },
    /// Insert collides with an existing unique value.
    Duplicate { table: &'static str, value: String },
    /// A reference column names a row that does not exist.
    MissingReference { table: &'static str },
    /// Session role does not allow writes.
    PermissionDenied { user_id: Uuid, action: &'static str },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::Referenced { table, id } => {
                write!(f, "{table} row {id} is still referenced by other records")
            }
            Self::Duplicate { table, value } => write!(f, "{table} already has `{value}`"),
            Self::MissingReference { table } => {
                write!(f, "{table} row refers to a record that does not exist")
            }
            Self::PermissionDenied { user_id, action } => {
                write!(f, "user {user_id} is not allowed to {action}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::Referenced { .. }
            | Self::Duplicate { .. }
            | Self::MissingReference { .. }
            | Self::PermissionDenied { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest id list bound into one `IN (...)` clause.
pub(crate) const IN_SET_CHUNK: usize = 500;

pub(crate) fn ensure_can_write(session: &Session, action: &'static str) -> RepoResult<()> {
    if session.can_write() {
        return Ok(());
    }
    Err(RepoError::PermissionDenied {
        user_id: session.user_id(),
        action,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Builds `?, ?, ?` for `count` bind slots.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub(crate) fn uuid_values<'a>(ids: impl IntoIterator<Item = &'a Uuid>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| Value::Text(id.to_string()))
        .collect()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    column: &str,
) -> RepoResult<Option<NaiveDate>> {
    value.map(|text| parse_date(&text, column)).transpose()
}

/// Decodes a stored choice column through the enum's `parse`.
pub(crate) fn parse_choice<T>(
    value: &str,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

/// Turns a foreign-key failure on insert into [`RepoError::MissingReference`]
/// and passes everything else through.
pub(crate) fn insert_error(table: &'static str, err: rusqlite::Error) -> RepoError {
    match classify_constraint(&err) {
        Some(ConstraintViolation::ForeignKey) => RepoError::MissingReference { table },
        _ => err.into(),
    }
}

/// Turns a foreign-key failure on delete into [`RepoError::Referenced`].
pub(crate) fn delete_error(table: &'static str, id: Uuid, err: rusqlite::Error) -> RepoError {
    match classify_constraint(&err) {
        Some(ConstraintViolation::ForeignKey) => RepoError::Referenced { table, id },
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_flag, placeholders};
    use chrono::NaiveDate;

    #[test]
    fn placeholders_join_with_commas() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn parse_flag_rejects_non_boolean_values() {
        assert!(parse_flag(1, "households.has_water").unwrap());
        assert!(parse_flag(2, "households.has_water").is_err());
    }

    #[test]
    fn parse_date_expects_iso_days() {
        assert_eq!(
            parse_date("2024-02-29", "reports.reported_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("02/29/2024", "reports.reported_date").is_err());
    }
}
