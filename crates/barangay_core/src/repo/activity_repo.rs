//! Activity repository contract and SQLite implementation.

use super::{
    ensure_can_write, format_date, parse_choice, parse_date, parse_uuid, RepoError, RepoResult,
};
use crate::model::activity::{Activity, ActivityId, ActivityStatus};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    title,
    activity_type,
    activity_date,
    location,
    organizer,
    participants_count,
    description,
    status,
    created_at,
    updated_at
FROM activities";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityListQuery {
    pub status: Option<ActivityStatus>,
}

pub trait ActivityRepository {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId>;
    fn update_activity(&self, activity: &Activity) -> RepoResult<()>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Lists activities by date, newest first.
    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>>;
    fn count_activities(&self, status: ActivityStatus) -> RepoResult<u32>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
}

pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId> {
        ensure_can_write(&self.session, "schedule activities")?;
        activity.validate()?;

        self.conn.execute(
            "INSERT INTO activities (
                id,
                title,
                activity_type,
                activity_date,
                location,
                organizer,
                participants_count,
                description,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                activity.id.to_string(),
                activity.title.trim(),
                activity.activity_type.trim(),
                format_date(activity.activity_date),
                activity.location.as_deref(),
                activity.organizer.as_deref(),
                activity.participants_count,
                activity.description.as_deref(),
                activity.status.as_str(),
            ],
        )?;
        Ok(activity.id)
    }

    fn update_activity(&self, activity: &Activity) -> RepoResult<()> {
        ensure_can_write(&self.session, "update activities")?;
        activity.validate()?;

        let changed = self.conn.execute(
            "UPDATE activities
             SET
                title = ?2,
                activity_type = ?3,
                activity_date = ?4,
                location = ?5,
                organizer = ?6,
                participants_count = ?7,
                description = ?8,
                status = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                activity.id.to_string(),
                activity.title.trim(),
                activity.activity_type.trim(),
                format_date(activity.activity_date),
                activity.location.as_deref(),
                activity.organizer.as_deref(),
                activity.participants_count,
                activity.description.as_deref(),
                activity.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "activities",
                id: activity.id,
            });
        }
        Ok(())
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        let mut sql = format!("{ACTIVITY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY activity_date DESC, title COLLATE NOCASE ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn count_activities(&self, status: ActivityStatus) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE status = ?1;",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete activities")?;
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "activities",
                id,
            });
        }
        Ok(())
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "activities.id")?;
    let date_text: String = row.get("activity_date")?;
    let status_text: String = row.get("status")?;
    let participants_count = match row.get::<_, Option<i64>>("participants_count")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid count `{value}` in activities.participants_count"
            ))
        })?),
        None => None,
    };

    let activity = Activity {
        id,
        title: row.get("title")?,
        activity_type: row.get("activity_type")?,
        activity_date: parse_date(&date_text, "activities.activity_date")?,
        location: row.get("location")?,
        organizer: row.get("organizer")?,
        participants_count,
        description: row.get("description")?,
        status: parse_choice(&status_text, "activities.status", ActivityStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    activity
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("activity {id}: {err}")))?;
    Ok(activity)
}
