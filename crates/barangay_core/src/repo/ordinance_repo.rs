//! Ordinance repository contract and SQLite implementation.
//!
//! # Invariants
//! - `ordinance_number` is unique; a second insert with the same number is
//!   reported as [`RepoError::Duplicate`].

use super::{
    ensure_can_write, format_date, parse_choice, parse_date, parse_uuid, RepoError, RepoResult,
};
use crate::db::{classify_constraint, ConstraintViolation};
use crate::model::ordinance::{Ordinance, OrdinanceId, OrdinanceStatus};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ORDINANCE_SELECT_SQL: &str = "SELECT
    id,
    ordinance_number,
    title,
    description,
    content,
    date_enacted,
    status,
    created_at,
    updated_at
FROM ordinances";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdinanceListQuery {
    pub status: Option<OrdinanceStatus>,
    /// Case-insensitive substring over number and title.
    pub search: Option<String>,
}

pub trait OrdinanceRepository {
    fn create_ordinance(&self, ordinance: &Ordinance) -> RepoResult<OrdinanceId>;
    fn update_ordinance(&self, ordinance: &Ordinance) -> RepoResult<()>;
    fn get_ordinance(&self, id: OrdinanceId) -> RepoResult<Option<Ordinance>>;
    /// Lists ordinances, most recently enacted first.
    fn list_ordinances(&self, query: &OrdinanceListQuery) -> RepoResult<Vec<Ordinance>>;
    fn delete_ordinance(&self, id: OrdinanceId) -> RepoResult<()>;
}

pub struct SqliteOrdinanceRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteOrdinanceRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }

    fn number_error(&self, number: &str, err: rusqlite::Error) -> RepoError {
        match classify_constraint(&err) {
            Some(ConstraintViolation::Unique) => RepoError::Duplicate {
                table: "ordinances",
                value: number.to_string(),
            },
            _ => err.into(),
        }
    }
}

impl OrdinanceRepository for SqliteOrdinanceRepository<'_> {
    fn create_ordinance(&self, ordinance: &Ordinance) -> RepoResult<OrdinanceId> {
        ensure_can_write(&self.session, "enact ordinances")?;
        ordinance.validate()?;

        let number = ordinance.ordinance_number.trim();
        self.conn
            .execute(
                "INSERT INTO ordinances (
                    id,
                    ordinance_number,
                    title,
                    description,
                    content,
                    date_enacted,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    ordinance.id.to_string(),
                    number,
                    ordinance.title.trim(),
                    ordinance.description.as_deref(),
                    ordinance.content.as_deref(),
                    format_date(ordinance.date_enacted),
                    ordinance.status.as_str(),
                ],
            )
            .map_err(|err| self.number_error(number, err))?;
        Ok(ordinance.id)
    }

    fn update_ordinance(&self, ordinance: &Ordinance) -> RepoResult<()> {
        ensure_can_write(&self.session, "update ordinances")?;
        ordinance.validate()?;

        let number = ordinance.ordinance_number.trim();
        let changed = self
            .conn
            .execute(
                "UPDATE ordinances
                 SET
                    ordinance_number = ?2,
                    title = ?3,
                    description = ?4,
                    content = ?5,
                    date_enacted = ?6,
                    status = ?7,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    ordinance.id.to_string(),
                    number,
                    ordinance.title.trim(),
                    ordinance.description.as_deref(),
                    ordinance.content.as_deref(),
                    format_date(ordinance.date_enacted),
                    ordinance.status.as_str(),
                ],
            )
            .map_err(|err| self.number_error(number, err))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "ordinances",
                id: ordinance.id,
            });
        }
        Ok(())
    }

    fn get_ordinance(&self, id: OrdinanceId) -> RepoResult<Option<Ordinance>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORDINANCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_ordinance_row(row)?));
        }
        Ok(None)
    }

    fn list_ordinances(&self, query: &OrdinanceListQuery) -> RepoResult<Vec<Ordinance>> {
        let mut sql = format!("{ORDINANCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(
                " AND (instr(lower(ordinance_number), lower(?)) > 0
                   OR instr(lower(title), lower(?)) > 0)",
            );
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }
        sql.push_str(" ORDER BY date_enacted DESC, ordinance_number ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut ordinances = Vec::new();
        while let Some(row) = rows.next()? {
            ordinances.push(parse_ordinance_row(row)?);
        }
        Ok(ordinances)
    }

    fn delete_ordinance(&self, id: OrdinanceId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete ordinances")?;
        let changed = self
            .conn
            .execute("DELETE FROM ordinances WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "ordinances",
                id,
            });
        }
        Ok(())
    }
}

fn parse_ordinance_row(row: &Row<'_>) -> RepoResult<Ordinance> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "ordinances.id")?;
    let enacted_text: String = row.get("date_enacted")?;
    let status_text: String = row.get("status")?;

    let ordinance = Ordinance {
        id,
        ordinance_number: row.get("ordinance_number")?,
        title: row.get("title")?,
        description: row.get("description")?,
        content: row.get("content")?,
        date_enacted: parse_date(&enacted_text, "ordinances.date_enacted")?,
        status: parse_choice(&status_text, "ordinances.status", OrdinanceStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    ordinance
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("ordinance {id}: {err}")))?;
    Ok(ordinance)
}
