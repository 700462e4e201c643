//! Registry use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into household/resident use cases.
//! - Own the household membership reconciliation.
//! - Serve the civic record workflows (appointments, enactments, filings,
//!   issuance) on top of their stores.
//! - Keep CLI and form layers decoupled from storage details.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod activity_service;
pub mod certificate_service;
pub mod dashboard_service;
pub mod document_service;
pub mod household_service;
pub mod membership;
pub mod official_service;
pub mod ordinance_service;
pub mod report_service;
pub mod resident_service;

/// Error shared by the civic record services.
#[derive(Debug)]
pub enum RecordServiceError {
    Validation(ValidationError),
    NotFound { table: &'static str, id: Uuid },
    /// Requested status change is not allowed from the stored status.
    InvalidTransition {
        table: &'static str,
        from: &'static str,
        to: &'static str,
    },
    Repo(RepoError),
}

impl Display for RecordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::InvalidTransition { table, from, to } => {
                write!(f, "{table} row cannot move from `{from}` to `{to}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidTransition { .. } => None,
        }
    }
}

impl From<ValidationError> for RecordServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for RecordServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { table, id } => Self::NotFound { table, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type RecordResult<T> = Result<T, RecordServiceError>;
