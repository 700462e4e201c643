//! Resident use-case service.
//!
//! # Responsibility
//! - Register and edit residents from form input.
//! - Serve resident lists for tables and the household member picker.
//!
//! # Invariants
//! - Newly registered residents start unassigned; households attach them.
//! - Edits never change household membership.

use crate::model::household::normalize_optional_text;
use crate::model::resident::{Gender, Resident, ResidentId, ResidentStatus};
use crate::model::validation::ValidationError;
use crate::repo::resident_repo::{ResidentListQuery, ResidentRepository};
use crate::repo::RepoError;
use chrono::{Local, NaiveDate};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resident form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentDraft {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub purok: Option<String>,
    pub street_address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub is_senior_citizen: bool,
    pub is_pwd: bool,
    pub is_indigenous: bool,
    pub status: ResidentStatus,
}

impl ResidentDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: Gender,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            date_of_birth,
            gender,
            purok: None,
            street_address: None,
            phone_number: None,
            email: None,
            is_senior_citizen: false,
            is_pwd: false,
            is_indigenous: false,
            status: ResidentStatus::Active,
        }
    }
}

#[derive(Debug)]
pub enum ResidentServiceError {
    Validation(ValidationError),
    ResidentNotFound(ResidentId),
    Repo(RepoError),
}

impl Display for ResidentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ResidentNotFound(id) => write!(f, "resident not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResidentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ResidentNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ResidentServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ResidentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                table: "residents",
                id,
            } => Self::ResidentNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub struct ResidentService<R: ResidentRepository> {
    repo: R,
}

impl<R: ResidentRepository> ResidentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new unassigned resident.
    pub fn register_resident(
        &self,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentServiceError> {
        let mut resident = Resident::new(
            String::new(),
            String::new(),
            draft.date_of_birth,
            draft.gender,
        );
        apply_draft(&mut resident, draft)?;
        let resident_id = self.repo.create_resident(&resident)?;
        info!("event=resident_create module=service status=ok resident_id={resident_id}");

        self.repo
            .get_resident(resident_id)?
            .ok_or(ResidentServiceError::ResidentNotFound(resident_id))
    }

    /// Replaces personal fields of an existing resident.
    pub fn update_resident(
        &self,
        resident_id: ResidentId,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentServiceError> {
        let mut resident = self
            .repo
            .get_resident(resident_id)?
            .ok_or(ResidentServiceError::ResidentNotFound(resident_id))?;
        apply_draft(&mut resident, draft)?;
        self.repo.update_resident(&resident)?;

        self.repo
            .get_resident(resident_id)?
            .ok_or(ResidentServiceError::ResidentNotFound(resident_id))
    }

    pub fn get_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Option<Resident>, ResidentServiceError> {
        Ok(self.repo.get_resident(resident_id)?)
    }

    pub fn list_residents(
        &self,
        query: &ResidentListQuery,
    ) -> Result<Vec<Resident>, ResidentServiceError> {
        Ok(self.repo.list_residents(query)?)
    }

    /// Every resident, ordered by first name, for the member picker.
    ///
    /// Residents of other households are included; selecting one moves it.
    pub fn assignable_residents(&self) -> Result<Vec<Resident>, ResidentServiceError> {
        self.list_residents(&ResidentListQuery::default())
    }
}

fn apply_draft(resident: &mut Resident, draft: &ResidentDraft) -> Result<(), ValidationError> {
    if draft.date_of_birth > Local::now().date_naive() {
        return Err(ValidationError::BirthDateInFuture);
    }

    resident.first_name = draft.first_name.trim().to_string();
    resident.middle_name = normalize_optional_text(draft.middle_name.as_deref());
    resident.last_name = draft.last_name.trim().to_string();
    resident.date_of_birth = draft.date_of_birth;
    resident.gender = draft.gender;
    resident.purok = normalize_optional_text(draft.purok.as_deref());
    resident.street_address = normalize_optional_text(draft.street_address.as_deref());
    resident.phone_number = normalize_optional_text(draft.phone_number.as_deref());
    resident.email = normalize_optional_text(draft.email.as_deref());
    resident.is_senior_citizen = draft.is_senior_citizen;
    resident.is_pwd = draft.is_pwd;
    resident.is_indigenous = draft.is_indigenous;
    resident.status = draft.status;
    resident.validate()
}
