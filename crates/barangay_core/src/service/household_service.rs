//! Household use-case service.
//!
//! # Responsibility
//! - Create, edit, and delete households together with their member sets.
//! - Normalize form input and apply the fallback map location.
//!
//! # Invariants
//! - Household fields are written before membership is reconciled.
//! - Deleting a household clears every member association first.
//! - A failed membership step reports the household id; callers retry by
//!   submitting the same draft to `update_household`, never by creating a
//!   second row.
//! - The household head, when set, is one of the drafted members.

use crate::model::household::{
    normalize_house_number, normalize_optional_text, GeoPoint, Household, HouseholdId,
};
use crate::model::resident::{Resident, ResidentId};
use crate::model::validation::ValidationError;
use crate::repo::household_repo::{HouseholdListQuery, HouseholdRepository, HouseholdSummary};
use crate::repo::resident_repo::{ResidentListQuery, ResidentRepository};
use crate::repo::RepoError;
use crate::service::membership::{MembershipPlan, MembershipReconciler, ReconcileError};
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Household form input as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseholdDraft {
    pub house_number: String,
    pub purok: Option<String>,
    pub street_address: Option<String>,
    pub has_electricity: bool,
    pub has_water: bool,
    /// Falls back to the service default point when `None`.
    pub location: Option<GeoPoint>,
    /// Residents that must belong to the household afterwards.
    pub member_ids: BTreeSet<ResidentId>,
    /// Must be one of `member_ids`.
    pub head_of_household_id: Option<ResidentId>,
}

#[derive(Debug)]
pub enum HouseholdServiceError {
    Validation(ValidationError),
    HouseholdNotFound(HouseholdId),
    Repo(RepoError),
    /// Household row was written but its membership was not reconciled.
    Membership {
        household_id: HouseholdId,
        source: ReconcileError,
    },
    /// Write succeeded but the read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for HouseholdServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::HouseholdNotFound(id) => write!(f, "household not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Membership {
                household_id,
                source,
            } => write!(f, "household {household_id} saved but {source}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent household state: {details}")
            }
        }
    }
}

impl Error for HouseholdServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Membership { source, .. } => Some(source),
            Self::HouseholdNotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for HouseholdServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for HouseholdServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                table: "households",
                id,
            } => Self::HouseholdNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Saved household together with the membership diff that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdSaved {
    pub household: Household,
    pub membership: MembershipPlan,
}

/// Household service facade over household and resident stores.
pub struct HouseholdService<H: HouseholdRepository, R: ResidentRepository> {
    households: H,
    members: MembershipReconciler<R>,
    default_location: GeoPoint,
}

impl<H: HouseholdRepository, R: ResidentRepository> HouseholdService<H, R> {
    pub fn new(households: H, residents: R, default_location: GeoPoint) -> Self {
        Self {
            households,
            members: MembershipReconciler::new(residents),
            default_location,
        }
    }

    /// Add flow: inserts the household, then attaches the selected members.
    pub fn create_household(
        &self,
        draft: &HouseholdDraft,
    ) -> Result<HouseholdSaved, HouseholdServiceError> {
        let mut household = Household::new(String::new());
        self.apply_draft(&mut household, draft)?;
        let household_id = self.households.create_household(&household)?;
        info!(
            "event=household_create module=service status=ok household_id={household_id}"
        );

        self.finish_save(household_id, &household.house_number, &draft.member_ids)
    }

    /// Edit flow: rewrites household fields, then reconciles members.
    pub fn update_household(
        &self,
        household_id: HouseholdId,
        draft: &HouseholdDraft,
    ) -> Result<HouseholdSaved, HouseholdServiceError> {
        let mut household = self
            .households
            .get_household(household_id)?
            .ok_or(HouseholdServiceError::HouseholdNotFound(household_id))?;
        self.apply_draft(&mut household, draft)?;
        self.households.update_household(&household)?;
        info!(
            "event=household_update module=service status=ok household_id={household_id}"
        );

        self.finish_save(household_id, &household.house_number, &draft.member_ids)
    }

    /// Clears all member associations, then deletes the household row.
    ///
    /// Returns the number of residents that were detached.
    pub fn delete_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<usize, HouseholdServiceError> {
        let household = self
            .households
            .get_household(household_id)?
            .ok_or(HouseholdServiceError::HouseholdNotFound(household_id))?;
        let plan = self
            .members
            .reconcile_membership(household_id, &household.house_number, &BTreeSet::new())
            .map_err(|source| HouseholdServiceError::Membership {
                household_id,
                source,
            })?;
        self.households.delete_household(household_id)?;
        info!(
            "event=household_delete module=service status=ok household_id={household_id} detached={}",
            plan.to_remove.len()
        );
        Ok(plan.to_remove.len())
    }

    pub fn get_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Option<Household>, HouseholdServiceError> {
        Ok(self.households.get_household(household_id)?)
    }

    /// Lists households with member counts, filtered by house number or purok.
    pub fn list_households(
        &self,
        search: Option<String>,
    ) -> Result<Vec<HouseholdSummary>, HouseholdServiceError> {
        Ok(self
            .households
            .list_households(&HouseholdListQuery { search })?)
    }

    /// Residents currently assigned to the household.
    pub fn household_members(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Resident>, HouseholdServiceError> {
        Ok(self.members.store().list_residents(&ResidentListQuery {
            household_id: Some(household_id),
            ..ResidentListQuery::default()
        })?)
    }

    fn apply_draft(
        &self,
        household: &mut Household,
        draft: &HouseholdDraft,
    ) -> Result<(), HouseholdServiceError> {
        household.house_number = normalize_house_number(&draft.house_number)?;
        household.purok = normalize_optional_text(draft.purok.as_deref());
        household.street_address = normalize_optional_text(draft.street_address.as_deref());
        household.has_electricity = draft.has_electricity;
        household.has_water = draft.has_water;
        household.location = Some(draft.location.unwrap_or(self.default_location));
        if let Some(head) = draft.head_of_household_id {
            if !draft.member_ids.contains(&head) {
                return Err(ValidationError::HeadNotMember.into());
            }
        }
        household.head_of_household_id = draft.head_of_household_id;
        household.validate()?;
        Ok(())
    }

    fn finish_save(
        &self,
        household_id: HouseholdId,
        house_number: &str,
        member_ids: &BTreeSet<ResidentId>,
    ) -> Result<HouseholdSaved, HouseholdServiceError> {
        let membership = self
            .members
            .reconcile_membership(household_id, house_number, member_ids)
            .map_err(|source| HouseholdServiceError::Membership {
                household_id,
                source,
            })?;

        let household = self.households.get_household(household_id)?.ok_or(
            HouseholdServiceError::InconsistentState("saved household not found in read-back"),
        )?;
        Ok(HouseholdSaved {
            household,
            membership,
        })
    }
}
