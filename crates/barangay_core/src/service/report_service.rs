//! Report intake and follow-up service.
//!
//! # Invariants
//! - Filed reports start pending regardless of the submitted status.
//! - A closed report is never reopened.

use super::{RecordResult, RecordServiceError};
use crate::model::report::{Report, ReportId, ReportStatus};
use crate::repo::report_repo::{ReportListQuery, ReportRepository};
use log::info;

pub struct ReportService<P: ReportRepository> {
    repo: P,
}

impl<P: ReportRepository> ReportService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    pub fn file_report(&self, report: &Report) -> RecordResult<Report> {
        let mut report = report.clone();
        report.status = ReportStatus::Pending;
        report.normalize()?;
        let id = self.repo.create_report(&report)?;
        info!(
            "event=report_file module=service status=ok report_id={id} priority={}",
            report.priority.as_str()
        );
        self.fetch(id)
    }

    pub fn set_status(&self, id: ReportId, status: ReportStatus) -> RecordResult<Report> {
        let mut report = self.fetch(id)?;
        if report.status == ReportStatus::Closed && status != ReportStatus::Closed {
            return Err(RecordServiceError::InvalidTransition {
                table: "reports",
                from: report.status.as_str(),
                to: status.as_str(),
            });
        }
        report.status = status;
        self.repo.update_report(&report)?;
        info!(
            "event=report_status module=service status=ok report_id={id} report_status={}",
            status.as_str()
        );
        self.fetch(id)
    }

    pub fn get_report(&self, id: ReportId) -> RecordResult<Option<Report>> {
        Ok(self.repo.get_report(id)?)
    }

    pub fn list_reports(&self, query: &ReportListQuery) -> RecordResult<Vec<Report>> {
        Ok(self.repo.list_reports(query)?)
    }

    pub fn delete_report(&self, id: ReportId) -> RecordResult<()> {
        self.repo.delete_report(id)?;
        Ok(())
    }

    fn fetch(&self, id: ReportId) -> RecordResult<Report> {
        self.repo
            .get_report(id)?
            .ok_or(RecordServiceError::NotFound { table: "reports", id })
    }
}
