//! Official appointment service.
//!
//! # Invariants
//! - Only registered residents are appointed.
//! - `current_officials` lists seats that are active on the given day.

use super::{RecordResult, RecordServiceError};
use crate::model::official::{Official, OfficialId, OfficialStatus};
use crate::model::resident::ResidentId;
use crate::repo::official_repo::{OfficialListQuery, OfficialRepository, OfficialSummary};
use crate::repo::resident_repo::ResidentRepository;
use chrono::NaiveDate;
use log::info;

/// Appointment form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub resident_id: ResidentId,
    pub position: String,
    pub term_start: NaiveDate,
    pub term_end: Option<NaiveDate>,
}

pub struct OfficialService<O: OfficialRepository, R: ResidentRepository> {
    officials: O,
    residents: R,
}

impl<O: OfficialRepository, R: ResidentRepository> OfficialService<O, R> {
    pub fn new(officials: O, residents: R) -> Self {
        Self {
            officials,
            residents,
        }
    }

    pub fn appoint_official(&self, appointment: &Appointment) -> RecordResult<Official> {
        if self
            .residents
            .get_resident(appointment.resident_id)?
            .is_none()
        {
            return Err(RecordServiceError::NotFound {
                table: "residents",
                id: appointment.resident_id,
            });
        }

        let mut official = Official::new(
            appointment.resident_id,
            appointment.position.trim(),
            appointment.term_start,
        );
        official.term_end = appointment.term_end;
        official.validate()?;
        let official_id = self.officials.create_official(&official)?;
        info!(
            "event=official_appoint module=service status=ok official_id={official_id} resident_id={}",
            appointment.resident_id
        );
        self.fetch(official_id)
    }

    /// Marks the seat active or inactive. Term dates are left as stored.
    pub fn set_status(&self, id: OfficialId, status: OfficialStatus) -> RecordResult<Official> {
        let mut official = self.fetch(id)?;
        official.status = status;
        self.officials.update_official(&official)?;
        self.fetch(id)
    }

    pub fn list_officials(
        &self,
        status: Option<OfficialStatus>,
    ) -> RecordResult<Vec<OfficialSummary>> {
        Ok(self.officials.list_officials(&OfficialListQuery { status })?)
    }

    /// Seats held on `day`.
    pub fn current_officials(&self, day: NaiveDate) -> RecordResult<Vec<OfficialSummary>> {
        Ok(self
            .list_officials(Some(OfficialStatus::Active))?
            .into_iter()
            .filter(|summary| summary.official.serves_on(day))
            .collect())
    }

    pub fn remove_official(&self, id: OfficialId) -> RecordResult<()> {
        self.officials.delete_official(id)?;
        info!("event=official_remove module=service status=ok official_id={id}");
        Ok(())
    }

    fn fetch(&self, id: OfficialId) -> RecordResult<Official> {
        self.officials
            .get_official(id)?
            .ok_or(RecordServiceError::NotFound {
                table: "officials",
                id,
            })
    }
}
