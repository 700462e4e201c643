//! Household form controller.
//!
//! # Responsibility
//! - Hold add/edit dialog state and apply field messages to it.
//! - Turn a submission into a service call and a user-facing outcome.
//!
//! # Invariants
//! - Blank house numbers never reach the service.
//! - A failed submission keeps every field and selection untouched.
//! - After an Add submission saved the row but failed on membership, the
//!   next submission edits that row instead of inserting a duplicate.
//! - The head of household is always a selected resident; unselecting the
//!   head clears it.

use crate::model::household::{GeoPoint, Household, HouseholdId};
use crate::model::resident::{Resident, ResidentId};
use crate::repo::household_repo::HouseholdRepository;
use crate::repo::resident_repo::ResidentRepository;
use crate::service::household_service::{HouseholdDraft, HouseholdService, HouseholdServiceError};
use log::warn;
use std::collections::BTreeSet;

/// Field-level change emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum HouseholdFormMessage {
    SetHouseNumber(String),
    SetPurok(String),
    SetStreetAddress(String),
    SetElectricity(bool),
    SetWater(bool),
    SetLocation(GeoPoint),
    /// Selects the resident when unselected, unselects it otherwise.
    ToggleResident(ResidentId),
    /// Marks a selected resident as head, selecting it if needed.
    SetHead(Option<ResidentId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(HouseholdId),
}

/// Result envelope shown to the user after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub ok: bool,
    pub household_id: Option<HouseholdId>,
    pub message: String,
    /// Underlying cause when `message` is a generic failure line.
    pub detail: Option<String>,
}

impl SubmitOutcome {
    fn success(message: impl Into<String>, household_id: HouseholdId) -> Self {
        Self {
            ok: true,
            household_id: Some(household_id),
            message: message.into(),
            detail: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            household_id: None,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdForm {
    mode: FormMode,
    house_number: String,
    purok: String,
    street_address: String,
    has_electricity: bool,
    has_water: bool,
    location: GeoPoint,
    selected: BTreeSet<ResidentId>,
    head: Option<ResidentId>,
    default_location: GeoPoint,
    /// Row inserted by an Add submission whose membership step failed.
    pending_household: Option<HouseholdId>,
}

impl HouseholdForm {
    /// Empty Add form centered on `default_location`.
    pub fn for_add(default_location: GeoPoint) -> Self {
        Self {
            mode: FormMode::Add,
            house_number: String::new(),
            purok: String::new(),
            street_address: String::new(),
            has_electricity: false,
            has_water: false,
            location: default_location,
            selected: BTreeSet::new(),
            head: None,
            default_location,
            pending_household: None,
        }
    }

    /// Edit form preloaded with the household and its current members.
    pub fn for_edit(
        household: &Household,
        members: &[Resident],
        default_location: GeoPoint,
    ) -> Self {
        let selected: BTreeSet<ResidentId> = members
            .iter()
            .filter(|resident| resident.household_id == Some(household.id))
            .map(|resident| resident.id)
            .collect();
        Self {
            mode: FormMode::Edit(household.id),
            house_number: household.house_number.clone(),
            purok: household.purok.clone().unwrap_or_default(),
            street_address: household.street_address.clone().unwrap_or_default(),
            has_electricity: household.has_electricity,
            has_water: household.has_water,
            location: household.location.unwrap_or(default_location),
            head: household
                .head_of_household_id
                .filter(|head| selected.contains(head)),
            selected,
            default_location,
            pending_household: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn house_number(&self) -> &str {
        &self.house_number
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn selected_residents(&self) -> &BTreeSet<ResidentId> {
        &self.selected
    }

    pub fn is_selected(&self, resident_id: ResidentId) -> bool {
        self.selected.contains(&resident_id)
    }

    pub fn head_of_household(&self) -> Option<ResidentId> {
        self.head
    }

    pub fn update(&mut self, message: HouseholdFormMessage) {
        match message {
            HouseholdFormMessage::SetHouseNumber(value) => self.house_number = value,
            HouseholdFormMessage::SetPurok(value) => self.purok = value,
            HouseholdFormMessage::SetStreetAddress(value) => self.street_address = value,
            HouseholdFormMessage::SetElectricity(value) => self.has_electricity = value,
            HouseholdFormMessage::SetWater(value) => self.has_water = value,
            HouseholdFormMessage::SetLocation(point) => self.location = point,
            HouseholdFormMessage::ToggleResident(resident_id) => {
                if self.selected.remove(&resident_id) {
                    if self.head == Some(resident_id) {
                        self.head = None;
                    }
                } else {
                    self.selected.insert(resident_id);
                }
            }
            HouseholdFormMessage::SetHead(head) => {
                if let Some(resident_id) = head {
                    self.selected.insert(resident_id);
                }
                self.head = head;
            }
        }
    }

    /// Draft the service would receive for the current state.
    pub fn draft(&self) -> HouseholdDraft {
        HouseholdDraft {
            house_number: self.house_number.clone(),
            purok: Some(self.purok.clone()),
            street_address: Some(self.street_address.clone()),
            has_electricity: self.has_electricity,
            has_water: self.has_water,
            location: Some(self.location),
            member_ids: self.selected.clone(),
            head_of_household_id: self.head,
        }
    }

    /// Validates and saves the form through `service`.
    ///
    /// Taking `&mut self` keeps one submission in flight per form.
    pub fn submit<H, R>(&mut self, service: &HouseholdService<H, R>) -> SubmitOutcome
    where
        H: HouseholdRepository,
        R: ResidentRepository,
    {
        if self.house_number.trim().is_empty() {
            return SubmitOutcome::failure("House number is required");
        }

        let draft = self.draft();
        let target = match (self.mode, self.pending_household) {
            (FormMode::Edit(household_id), _) | (FormMode::Add, Some(household_id)) => {
                Some(household_id)
            }
            (FormMode::Add, None) => None,
        };
        let result = match target {
            Some(household_id) => service.update_household(household_id, &draft),
            None => service.create_household(&draft),
        };

        match (self.mode, result) {
            (FormMode::Add, Ok(saved)) => {
                *self = Self::for_add(self.default_location);
                SubmitOutcome::success("Household created successfully", saved.household.id)
            }
            (FormMode::Edit(_), Ok(saved)) => {
                SubmitOutcome::success("Household updated successfully", saved.household.id)
            }
            (mode, Err(err)) => {
                warn!(
                    "event=household_submit module=form status=error mode={} error={}",
                    if mode == FormMode::Add { "add" } else { "edit" },
                    err
                );
                if let (FormMode::Add, HouseholdServiceError::Membership { household_id, .. }) =
                    (mode, &err)
                {
                    self.pending_household = Some(*household_id);
                }
                match (mode, err) {
                    (_, HouseholdServiceError::Validation(err)) => {
                        SubmitOutcome::failure(err.to_string())
                    }
                    (FormMode::Add, err) => {
                        SubmitOutcome::failure("Failed to create household")
                            .with_detail(err.to_string())
                    }
                    (FormMode::Edit(_), err) => {
                        SubmitOutcome::failure("Failed to update household")
                            .with_detail(err.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormMode, HouseholdForm, HouseholdFormMessage};
    use crate::config::FALLBACK_LOCATION;
    use crate::model::household::{GeoPoint, Household};
    use crate::model::resident::{Gender, Resident};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn toggle_resident_selects_then_unselects() {
        let mut form = HouseholdForm::for_add(FALLBACK_LOCATION);
        let resident_id = Uuid::new_v4();

        form.update(HouseholdFormMessage::ToggleResident(resident_id));
        assert!(form.is_selected(resident_id));
        form.update(HouseholdFormMessage::ToggleResident(resident_id));
        assert!(!form.is_selected(resident_id));
    }

    #[test]
    fn edit_form_loads_members_and_falls_back_to_default_location() {
        let household = Household::new("7B");
        let mut member = Resident::new(
            "Maria",
            "Santos",
            NaiveDate::from_ymd_opt(1957, 4, 2).unwrap(),
            Gender::Female,
        );
        member.household_id = Some(household.id);
        member.house_number = Some("7B".to_string());
        let outsider = Resident::new(
            "Carlos",
            "Martinez",
            NaiveDate::from_ymd_opt(1951, 8, 9).unwrap(),
            Gender::Male,
        );

        let form =
            HouseholdForm::for_edit(&household, &[member.clone(), outsider], FALLBACK_LOCATION);
        assert_eq!(form.mode(), FormMode::Edit(household.id));
        assert_eq!(form.house_number(), "7B");
        assert_eq!(form.selected_residents().len(), 1);
        assert!(form.is_selected(member.id));
        assert_eq!(form.location(), FALLBACK_LOCATION);
    }

    #[test]
    fn unselecting_head_clears_it() {
        let mut form = HouseholdForm::for_add(FALLBACK_LOCATION);
        let head = Uuid::new_v4();

        form.update(HouseholdFormMessage::SetHead(Some(head)));
        assert!(form.is_selected(head));
        assert_eq!(form.draft().head_of_household_id, Some(head));

        form.update(HouseholdFormMessage::ToggleResident(head));
        assert_eq!(form.head_of_household(), None);
        assert_eq!(form.draft().head_of_household_id, None);
    }

    #[test]
    fn draft_carries_picked_location() {
        let mut form = HouseholdForm::for_add(FALLBACK_LOCATION);
        form.update(HouseholdFormMessage::SetLocation(GeoPoint::new(17.6, 120.9)));
        form.update(HouseholdFormMessage::SetHouseNumber("12".to_string()));
        let draft = form.draft();
        assert_eq!(draft.location, Some(GeoPoint::new(17.6, 120.9)));
        assert_eq!(draft.house_number, "12");
    }
}
