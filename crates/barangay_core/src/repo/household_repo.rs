//! Household repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `households` table.
//! - Keep resident `house_number` copies in step when a household is renamed.
//!
//! # Invariants
//! - `house_number` is validated non-blank before every insert/update.
//! - Listing returns member counts computed from `residents.household_id`.

use super::{
    bool_to_int, delete_error, ensure_can_write, insert_error, parse_flag, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::household::{GeoPoint, Household, HouseholdId};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const HOUSEHOLD_SELECT_SQL: &str = "SELECT
    h.id,
    h.house_number,
    h.purok,
    h.street_address,
    h.has_electricity,
    h.has_water,
    h.latitude,
    h.longitude,
    h.head_of_household_id,
    h.created_at,
    h.updated_at
FROM households h";

/// List filter for the households table view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseholdListQuery {
    /// Case-insensitive substring matched against house number or purok.
    pub search: Option<String>,
}

/// Household row plus its current member count.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdSummary {
    pub household: Household,
    pub member_count: u32,
}

/// Repository interface for household records.
pub trait HouseholdRepository {
    fn create_household(&self, household: &Household) -> RepoResult<HouseholdId>;
    /// Replaces all editable fields. Members follow a house number change.
    fn update_household(&self, household: &Household) -> RepoResult<()>;
    fn get_household(&self, id: HouseholdId) -> RepoResult<Option<Household>>;
    /// Lists households ordered by house number.
    fn list_households(&self, query: &HouseholdListQuery) -> RepoResult<Vec<HouseholdSummary>>;
    /// Deletes the row. Fails with [`RepoError::Referenced`] while residents
    /// still reference it.
    fn delete_household(&self, id: HouseholdId) -> RepoResult<()>;
}

/// SQLite-backed household repository scoped to one session.
pub struct SqliteHouseholdRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteHouseholdRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl HouseholdRepository for SqliteHouseholdRepository<'_> {
    fn create_household(&self, household: &Household) -> RepoResult<HouseholdId> {
        ensure_can_write(&self.session, "create households")?;
        household.validate()?;

        self.conn
            .execute(
                "INSERT INTO households (
                    id,
                    house_number,
                    purok,
                    street_address,
                    has_electricity,
                    has_water,
                    latitude,
                    longitude,
                    head_of_household_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    household.id.to_string(),
                    household.house_number.trim(),
                    household.purok.as_deref(),
                    household.street_address.as_deref(),
                    bool_to_int(household.has_electricity),
                    bool_to_int(household.has_water),
                    household.location.map(|point| point.latitude),
                    household.location.map(|point| point.longitude),
                    household.head_of_household_id.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| insert_error("households", err))?;

        Ok(household.id)
    }

    fn update_household(&self, household: &Household) -> RepoResult<()> {
        ensure_can_write(&self.session, "update households")?;
        household.validate()?;

        let id_text = household.id.to_string();
        let house_number = household.house_number.trim();
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx
            .execute(
                "UPDATE households
                 SET
                    house_number = ?2,
                    purok = ?3,
                    street_address = ?4,
                    has_electricity = ?5,
                    has_water = ?6,
                    latitude = ?7,
                    longitude = ?8,
                    head_of_household_id = ?9,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    id_text.as_str(),
                    house_number,
                    household.purok.as_deref(),
                    household.street_address.as_deref(),
                    bool_to_int(household.has_electricity),
                    bool_to_int(household.has_water),
                    household.location.map(|point| point.latitude),
                    household.location.map(|point| point.longitude),
                    household.head_of_household_id.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| insert_error("households", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "households",
                id: household.id,
            });
        }

        tx.execute(
            "UPDATE residents
             SET
                house_number = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE household_id = ?1
               AND house_number IS NOT ?2;",
            params![id_text.as_str(), house_number],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn get_household(&self, id: HouseholdId) -> RepoResult<Option<Household>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HOUSEHOLD_SELECT_SQL} WHERE h.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_household_row(row)?));
        }
        Ok(None)
    }

    fn list_households(&self, query: &HouseholdListQuery) -> RepoResult<Vec<HouseholdSummary>> {
        let mut sql = String::from(
            "SELECT
                h.id,
                h.house_number,
                h.purok,
                h.street_address,
                h.has_electricity,
                h.has_water,
                h.latitude,
                h.longitude,
                h.head_of_household_id,
                h.created_at,
                h.updated_at,
                (SELECT COUNT(*) FROM residents r WHERE r.household_id = h.id) AS member_count
             FROM households h
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(
                " AND (instr(lower(h.house_number), lower(?1)) > 0
                   OR instr(lower(coalesce(h.purok, '')), lower(?1)) > 0)",
            );
            bind_values.push(Value::Text(search.to_string()));
        }

        sql.push_str(" ORDER BY h.house_number COLLATE NOCASE ASC, h.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let member_count: i64 = row.get("member_count")?;
            summaries.push(HouseholdSummary {
                household: parse_household_row(row)?,
                member_count: u32::try_from(member_count).map_err(|_| {
                    RepoError::InvalidData(format!("invalid member count `{member_count}`"))
                })?,
            });
        }

        Ok(summaries)
    }

    fn delete_household(&self, id: HouseholdId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete households")?;

        let changed = self
            .conn
            .execute("DELETE FROM households WHERE id = ?1;", [id.to_string()])
            .map_err(|err| delete_error("households", id, err))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "households",
                id,
            });
        }
        Ok(())
    }
}

fn parse_household_row(row: &Row<'_>) -> RepoResult<Household> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "households.id")?;

    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "household {id} has a partial coordinate pair"
            )));
        }
    };

    let head_of_household_id = match row.get::<_, Option<String>>("head_of_household_id")? {
        Some(value) => Some(parse_uuid(&value, "households.head_of_household_id")?),
        None => None,
    };

    let household = Household {
        id,
        house_number: row.get("house_number")?,
        purok: row.get("purok")?,
        street_address: row.get("street_address")?,
        has_electricity: parse_flag(row.get("has_electricity")?, "households.has_electricity")?,
        has_water: parse_flag(row.get("has_water")?, "households.has_water")?,
        location,
        head_of_household_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    household
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("household {id}: {err}")))?;
    Ok(household)
}
