//! Ordinance service: enactment, amendment, and repeal.

use super::{RecordResult, RecordServiceError};
use crate::model::ordinance::{Ordinance, OrdinanceId, OrdinanceStatus};
use crate::repo::ordinance_repo::{OrdinanceListQuery, OrdinanceRepository};
use log::info;

pub struct OrdinanceService<O: OrdinanceRepository> {
    repo: O,
}

impl<O: OrdinanceRepository> OrdinanceService<O> {
    pub fn new(repo: O) -> Self {
        Self { repo }
    }

    /// Records a newly enacted ordinance. Status is forced to active.
    pub fn enact_ordinance(&self, ordinance: &Ordinance) -> RecordResult<Ordinance> {
        let mut ordinance = ordinance.clone();
        ordinance.status = OrdinanceStatus::Active;
        ordinance.normalize()?;
        let id = self.repo.create_ordinance(&ordinance)?;
        info!(
            "event=ordinance_enact module=service status=ok ordinance_id={id} number={}",
            ordinance.ordinance_number
        );
        self.fetch(id)
    }

    pub fn update_ordinance(&self, ordinance: &Ordinance) -> RecordResult<Ordinance> {
        let mut ordinance = ordinance.clone();
        ordinance.normalize()?;
        self.repo.update_ordinance(&ordinance)?;
        self.fetch(ordinance.id)
    }

    /// A repealed ordinance stays repealed.
    pub fn set_status(&self, id: OrdinanceId, status: OrdinanceStatus) -> RecordResult<Ordinance> {
        let mut ordinance = self.fetch(id)?;
        if ordinance.status == OrdinanceStatus::Repealed && status != OrdinanceStatus::Repealed {
            return Err(RecordServiceError::InvalidTransition {
                table: "ordinances",
                from: ordinance.status.as_str(),
                to: status.as_str(),
            });
        }
        ordinance.status = status;
        self.repo.update_ordinance(&ordinance)?;
        self.fetch(id)
    }

    pub fn get_ordinance(&self, id: OrdinanceId) -> RecordResult<Option<Ordinance>> {
        Ok(self.repo.get_ordinance(id)?)
    }

    pub fn list_ordinances(&self, query: &OrdinanceListQuery) -> RecordResult<Vec<Ordinance>> {
        Ok(self.repo.list_ordinances(query)?)
    }

    pub fn delete_ordinance(&self, id: OrdinanceId) -> RecordResult<()> {
        self.repo.delete_ordinance(id)?;
        info!("event=ordinance_delete module=service status=ok ordinance_id={id}");
        Ok(())
    }

    fn fetch(&self, id: OrdinanceId) -> RecordResult<Ordinance> {
        self.repo
            .get_ordinance(id)?
            .ok_or(RecordServiceError::NotFound {
                table: "ordinances",
                id,
            })
    }
}
