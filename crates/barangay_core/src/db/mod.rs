//! Records database: connection bootstrap, schema, and SQLite error triage.
//!
//! # Responsibility
//! - Hand out connections with the registry schema fully migrated.
//! - Classify SQLite constraint failures so stores can report which rule a
//!   write broke (dangling reference, duplicate number, failed check).
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer build is refused, never downgraded.

use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened at all.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// Schema version on disk is ahead of this build.
    SchemaTooNew { found: u32, supported: u32 },
}

/// Integrity rule a rejected write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Row still referenced, or a reference to a missing row.
    ForeignKey,
    /// Duplicate value in a `UNIQUE` or primary key column.
    Unique,
    Check,
    NotNull,
}

impl DbError {
    /// Returns which constraint rejected the statement, if any.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        match self {
            Self::Sqlite(err) | Self::Open { source: err, .. } => classify_constraint(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

/// Maps SQLite extended result codes onto [`ConstraintViolation`].
pub fn classify_constraint(err: &rusqlite::Error) -> Option<ConstraintViolation> {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return None;
    };
    if failure.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }
    match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintViolation::ForeignKey),
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            Some(ConstraintViolation::Unique)
        }
        ffi::SQLITE_CONSTRAINT_CHECK => Some(ConstraintViolation::Check),
        ffi::SQLITE_CONSTRAINT_NOTNULL => Some(ConstraintViolation::NotNull),
        _ => None,
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open records db {target}: {source}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "records db uses schema v{found}; this build understands up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
