//! Report repository contract and SQLite implementation.

use super::{
    ensure_can_write, format_date, parse_choice, parse_date, parse_uuid, RepoError, RepoResult,
};
use crate::model::report::{Report, ReportId, ReportPriority, ReportStatus};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const REPORT_SELECT_SQL: &str = "SELECT
    id,
    title,
    report_type,
    description,
    location,
    priority,
    reported_by,
    reported_date,
    status,
    created_at,
    updated_at
FROM reports";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportListQuery {
    pub status: Option<ReportStatus>,
    /// Only reports at or above this priority.
    pub min_priority: Option<ReportPriority>,
}

pub trait ReportRepository {
    fn create_report(&self, report: &Report) -> RepoResult<ReportId>;
    fn update_report(&self, report: &Report) -> RepoResult<()>;
    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>>;
    /// Lists reports, most recently reported first.
    fn list_reports(&self, query: &ReportListQuery) -> RepoResult<Vec<Report>>;
    /// Counts reports, optionally only those in `status`.
    fn count_reports(&self, status: Option<ReportStatus>) -> RepoResult<u32>;
    fn delete_report(&self, id: ReportId) -> RepoResult<()>;
}

pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn create_report(&self, report: &Report) -> RepoResult<ReportId> {
        ensure_can_write(&self.session, "file reports")?;
        report.validate()?;

        self.conn.execute(
            "INSERT INTO reports (
                id,
                title,
                report_type,
                description,
                location,
                priority,
                reported_by,
                reported_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                report.id.to_string(),
                report.title.trim(),
                report.report_type.trim(),
                report.description.as_deref(),
                report.location.as_deref(),
                report.priority.as_str(),
                report.reported_by.as_deref(),
                format_date(report.reported_date),
                report.status.as_str(),
            ],
        )?;
        Ok(report.id)
    }

    fn update_report(&self, report: &Report) -> RepoResult<()> {
        ensure_can_write(&self.session, "update reports")?;
        report.validate()?;

        let changed = self.conn.execute(
            "UPDATE reports
             SET
                title = ?2,
                report_type = ?3,
                description = ?4,
                location = ?5,
                priority = ?6,
                reported_by = ?7,
                reported_date = ?8,
                status = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                report.id.to_string(),
                report.title.trim(),
                report.report_type.trim(),
                report.description.as_deref(),
                report.location.as_deref(),
                report.priority.as_str(),
                report.reported_by.as_deref(),
                format_date(report.reported_date),
                report.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "reports",
                id: report.id,
            });
        }
        Ok(())
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_report_row(row)?));
        }
        Ok(None)
    }

    fn list_reports(&self, query: &ReportListQuery) -> RepoResult<Vec<Report>> {
        let mut sql = format!("{REPORT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY reported_date DESC, created_at DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            let report = parse_report_row(row)?;
            if query
                .min_priority
                .map_or(true, |floor| report.priority >= floor)
            {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn count_reports(&self, status: Option<ReportStatus>) -> RepoResult<u32> {
        let count: u32 = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM reports WHERE status = ?1;",
                [status.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM reports;", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    fn delete_report(&self, id: ReportId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete reports")?;
        let changed = self
            .conn
            .execute("DELETE FROM reports WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "reports",
                id,
            });
        }
        Ok(())
    }
}

fn parse_report_row(row: &Row<'_>) -> RepoResult<Report> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "reports.id")?;
    let date_text: String = row.get("reported_date")?;
    let priority_text: String = row.get("priority")?;
    let status_text: String = row.get("status")?;

    let report = Report {
        id,
        title: row.get("title")?,
        report_type: row.get("report_type")?,
        description: row.get("description")?,
        location: row.get("location")?,
        priority: parse_choice(&priority_text, "reports.priority", ReportPriority::parse)?,
        reported_by: row.get("reported_by")?,
        reported_date: parse_date(&date_text, "reports.reported_date")?,
        status: parse_choice(&status_text, "reports.status", ReportStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    report
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("report {id}: {err}")))?;
    Ok(report)
}
