use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const DAY_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn day_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DAY_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("{s}: {e}").into())
    })
}

fn page_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Page> {
    let s: String = row.get(idx)?;
    Page::parse(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown page key: {s}").into(),
        )
    })
}

fn level_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<AccessLevel> {
    let s: String = row.get(idx)?;
    AccessLevel::parse(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown access level: {s}").into(),
        )
    })
}

const USER_COLUMNS: &str = "id, username, display_name, password_hash, must_change_password, \
                            is_active, token_version, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        password_hash: row.get(3)?,
        must_change_password: row.get(4)?,
        is_active: row.get(5)?,
        token_version: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const TEAM_COLUMNS: &str = "id, name, code, description, created_at, updated_at";

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const PERSON_COLUMNS: &str =
    "id, team_id, name, active, show_in_schedule, sort_index, created_at, updated_at";

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        team_id: row.get(1)?,
        name: row.get(2)?,
        active: row.get(3)?,
        show_in_schedule: row.get(4)?,
        sort_index: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

const SHIFT_COLUMNS: &str = "id, team_id, code, display_name, bg_color, text_color, sort_order, \
                             is_active, created_at, updated_at";

fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<ShiftDefinition> {
    Ok(ShiftDefinition {
        id: row.get(0)?,
        team_id: row.get(1)?,
        code: row.get(2)?,
        display_name: row.get(3)?,
        bg_color: row.get(4)?,
        text_color: row.get(5)?,
        sort_order: row.get(6)?,
        is_active: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

const ENTRY_COLUMNS: &str = "id, team_id, person_id, day, shift_code, updated_at, updated_by";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.get(0)?,
        team_id: row.get(1)?,
        person_id: row.get(2)?,
        day: day_column(row, 3)?,
        shift_code: row.get(4)?,
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_by: row.get(6)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<User> {
        let conn = self.conn();

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![user.username],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Conflict("duplicate_username"));
        }

        conn.execute(
            "INSERT INTO users (username, display_name, password_hash, must_change_password, \
             is_active, token_version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.username,
                user.display_name,
                user.password_hash,
                user.must_change_password,
                user.is_active,
                user.token_version,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .map_err(Error::from)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))?;

        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET display_name = ?1, password_hash = ?2, must_change_password = ?3, \
             is_active = ?4, token_version = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                user.display_name,
                user.password_hash,
                user.must_change_password,
                user.is_active,
                user.token_version,
                format_datetime(&Utc::now()),
                user.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Children first; the schema has no ON DELETE clauses on purpose.
        tx.execute(
            "DELETE FROM user_page_permissions WHERE user_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM user_team_permissions WHERE user_id = ?1",
            params![id],
        )?;
        let rows = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn count_users(&self) -> Result<i64> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Error::from)
    }

    // Permission lookups

    fn get_page_permission(&self, user_id: i64, page: Page) -> Result<Option<PagePermission>> {
        self.conn()
            .query_row(
                "SELECT user_id, page, can_view, can_edit FROM user_page_permissions
                 WHERE user_id = ?1 AND page = ?2",
                params![user_id, page.as_str()],
                |row| {
                    Ok(PagePermission {
                        user_id: row.get(0)?,
                        page: page_column(row, 1)?,
                        can_view: row.get(2)?,
                        can_edit: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_page_permissions(&self, user_id: i64) -> Result<Vec<PagePermission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, page, can_view, can_edit FROM user_page_permissions
             WHERE user_id = ?1 ORDER BY page",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(PagePermission {
                user_id: row.get(0)?,
                page: page_column(row, 1)?,
                can_view: row.get(2)?,
                can_edit: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_team_permission(&self, user_id: i64, team_id: i64) -> Result<Option<TeamPermission>> {
        self.conn()
            .query_row(
                "SELECT user_id, team_id, access_level FROM user_team_permissions
                 WHERE user_id = ?1 AND team_id = ?2",
                params![user_id, team_id],
                |row| {
                    Ok(TeamPermission {
                        user_id: row.get(0)?,
                        team_id: row.get(1)?,
                        access_level: level_column(row, 2)?,
                    })
                },
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_team_permissions(&self, user_id: i64) -> Result<Vec<TeamPermission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, team_id, access_level FROM user_team_permissions
             WHERE user_id = ?1 ORDER BY team_id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(TeamPermission {
                user_id: row.get(0)?,
                team_id: row.get(1)?,
                access_level: level_column(row, 2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn apply_user_update(&self, user_id: i64, update: &UserUpdate) -> Result<User> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut user = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                user_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        if let Some(display_name) = &update.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(hash) = &update.password_hash {
            user.password_hash = hash.clone();
            user.must_change_password = false;
            user.token_version += 1;
        }
        user.updated_at = Utc::now();

        tx.execute(
            "UPDATE users SET display_name = ?1, password_hash = ?2, must_change_password = ?3, \
             token_version = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                user.display_name,
                user.password_hash,
                user.must_change_password,
                user.token_version,
                format_datetime(&user.updated_at),
                user_id,
            ],
        )?;

        // Page permissions: pages missing from the desired set are removed,
        // the rest are updated in place or inserted.
        let existing_pages: Vec<Page> = {
            let mut stmt = tx
                .prepare("SELECT page FROM user_page_permissions WHERE user_id = ?1")?;
            let rows = stmt.query_map(params![user_id], |row| page_column(row, 0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        for page in existing_pages {
            if !update.pages.iter().any(|g| g.page == page) {
                tx.execute(
                    "DELETE FROM user_page_permissions WHERE user_id = ?1 AND page = ?2",
                    params![user_id, page.as_str()],
                )?;
            }
        }

        for grant in &update.pages {
            let updated = tx.execute(
                "UPDATE user_page_permissions SET can_view = ?1, can_edit = ?2
                 WHERE user_id = ?3 AND page = ?4",
                params![grant.can_view, grant.can_edit, user_id, grant.page.as_str()],
            )?;
            if updated == 0 {
                tx.execute(
                    "INSERT INTO user_page_permissions (user_id, page, can_view, can_edit)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![user_id, grant.page.as_str(), grant.can_view, grant.can_edit],
                )?;
            }
        }

        // Team permissions: an absent level removes the row, like a team
        // missing from the desired set.
        let existing_teams: Vec<i64> = {
            let mut stmt = tx
                .prepare("SELECT team_id FROM user_team_permissions WHERE user_id = ?1")?;
            let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        for team_id in existing_teams {
            let kept = update
                .teams
                .iter()
                .any(|g| g.team_id == team_id && g.access_level.is_some());
            if !kept {
                tx.execute(
                    "DELETE FROM user_team_permissions WHERE user_id = ?1 AND team_id = ?2",
                    params![user_id, team_id],
                )?;
            }
        }

        for grant in &update.teams {
            let Some(level) = grant.access_level else {
                continue;
            };

            let team_exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM teams WHERE id = ?1",
                    params![grant.team_id],
                    |row| row.get(0),
                )
                .optional()?;
            if team_exists.is_none() {
                return Err(Error::TeamNotFound);
            }

            let updated = tx.execute(
                "UPDATE user_team_permissions SET access_level = ?1
                 WHERE user_id = ?2 AND team_id = ?3",
                params![level.as_str(), user_id, grant.team_id],
            )?;
            if updated == 0 {
                tx.execute(
                    "INSERT INTO user_team_permissions (user_id, team_id, access_level)
                     VALUES (?1, ?2, ?3)",
                    params![user_id, grant.team_id, level.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(user)
    }

    // Team operations

    fn create_team(&self, team: &Team) -> Result<Team> {
        let conn = self.conn();

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM teams WHERE name = ?1 OR code = ?2",
                params![team.name, team.code],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Conflict("duplicate_team"));
        }

        conn.execute(
            "INSERT INTO teams (name, code, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                team.name,
                team.code,
                team.description,
                format_datetime(&team.created_at),
                format_datetime(&team.updated_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
            params![id],
            team_from_row,
        )
        .map_err(Error::from)
    }

    fn get_team(&self, id: i64) -> Result<Option<Team>> {
        self.conn()
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
                params![id],
                team_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY name"))?;

        let rows = stmt.query_map([], team_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_team(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM schedule_entries WHERE team_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM people WHERE team_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM shift_definitions WHERE team_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM user_team_permissions WHERE team_id = ?1",
            params![id],
        )?;
        let rows = tx.execute("DELETE FROM teams WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    // Person operations

    fn create_person(&self, person: &Person) -> Result<Person> {
        let conn = self.conn();

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM people WHERE team_id = ?1 AND name = ?2",
                params![person.team_id, person.name],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Conflict("duplicate_person"));
        }

        conn.execute(
            "INSERT INTO people (team_id, name, active, show_in_schedule, sort_index, \
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                person.team_id,
                person.name,
                person.active,
                person.show_in_schedule,
                person.sort_index,
                format_datetime(&person.created_at),
                format_datetime(&person.updated_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            params![id],
            person_from_row,
        )
        .map_err(Error::from)
    }

    fn get_person(&self, id: i64) -> Result<Option<Person>> {
        self.conn()
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
                params![id],
                person_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_people(&self, team_id: i64) -> Result<Vec<Person>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people WHERE team_id = ?1 ORDER BY sort_index, name"
        ))?;

        let rows = stmt.query_map(params![team_id], person_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_roster_people(&self, team_id: i64) -> Result<Vec<Person>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people
             WHERE team_id = ?1 AND active = 1 AND show_in_schedule = 1
             ORDER BY sort_index, name"
        ))?;

        let rows = stmt.query_map(params![team_id], person_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_person(&self, id: i64, patch: &PersonPatch) -> Result<Person> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut person = tx
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
                params![id],
                person_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        if let Some(name) = &patch.name {
            let taken: Option<i64> = tx
                .query_row(
                    "SELECT id FROM people WHERE team_id = ?1 AND name = ?2 AND id != ?3",
                    params![person.team_id, name, id],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(Error::Conflict("duplicate_person"));
            }
            person.name = name.clone();
        }
        if let Some(active) = patch.active {
            person.active = active;
        }
        if let Some(show) = patch.show_in_schedule {
            person.show_in_schedule = show;
        }
        if let Some(sort_index) = patch.sort_index {
            person.sort_index = sort_index;
        }
        person.updated_at = Utc::now();

        tx.execute(
            "UPDATE people SET name = ?1, active = ?2, show_in_schedule = ?3, sort_index = ?4, \
             updated_at = ?5 WHERE id = ?6",
            params![
                person.name,
                person.active,
                person.show_in_schedule,
                person.sort_index,
                format_datetime(&person.updated_at),
                id,
            ],
        )?;

        tx.commit()?;
        Ok(person)
    }

    fn delete_person(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM schedule_entries WHERE person_id = ?1",
            params![id],
        )?;
        let rows = tx.execute("DELETE FROM people WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    // Shift definition operations

    fn create_shift(&self, shift: &ShiftDefinition) -> Result<ShiftDefinition> {
        let conn = self.conn();

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM shift_definitions WHERE team_id = ?1 AND code = ?2",
                params![shift.team_id, shift.code],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Conflict("duplicate_shift_code"));
        }

        conn.execute(
            "INSERT INTO shift_definitions (team_id, code, display_name, bg_color, text_color, \
             sort_order, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                shift.team_id,
                shift.code,
                shift.display_name,
                shift.bg_color,
                shift.text_color,
                shift.sort_order,
                shift.is_active,
                format_datetime(&shift.created_at),
                format_datetime(&shift.updated_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {SHIFT_COLUMNS} FROM shift_definitions WHERE id = ?1"),
            params![id],
            shift_from_row,
        )
        .map_err(Error::from)
    }

    fn get_shift(&self, id: i64) -> Result<Option<ShiftDefinition>> {
        self.conn()
            .query_row(
                &format!("SELECT {SHIFT_COLUMNS} FROM shift_definitions WHERE id = ?1"),
                params![id],
                shift_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_active_shift_by_code(
        &self,
        team_id: i64,
        code: &str,
    ) -> Result<Option<ShiftDefinition>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {SHIFT_COLUMNS} FROM shift_definitions
                     WHERE team_id = ?1 AND code = ?2 AND is_active = 1"
                ),
                params![team_id, code],
                shift_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_shifts(&self, team_id: i64) -> Result<Vec<ShiftDefinition>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shift_definitions
             WHERE team_id = ?1 ORDER BY sort_order, id"
        ))?;

        let rows = stmt.query_map(params![team_id], shift_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_shift(&self, id: i64, patch: &ShiftPatch) -> Result<ShiftDefinition> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut shift = tx
            .query_row(
                &format!("SELECT {SHIFT_COLUMNS} FROM shift_definitions WHERE id = ?1"),
                params![id],
                shift_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        if let Some(display_name) = &patch.display_name {
            shift.display_name = display_name.clone();
        }
        if let Some(bg_color) = &patch.bg_color {
            shift.bg_color = bg_color.clone();
        }
        if let Some(text_color) = &patch.text_color {
            shift.text_color = text_color.clone();
        }
        if let Some(sort_order) = patch.sort_order {
            shift.sort_order = sort_order;
        }
        if let Some(is_active) = patch.is_active {
            shift.is_active = is_active;
        }
        shift.updated_at = Utc::now();

        tx.execute(
            "UPDATE shift_definitions SET display_name = ?1, bg_color = ?2, text_color = ?3, \
             sort_order = ?4, is_active = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                shift.display_name,
                shift.bg_color,
                shift.text_color,
                shift.sort_order,
                shift.is_active,
                format_datetime(&shift.updated_at),
                id,
            ],
        )?;

        tx.commit()?;
        Ok(shift)
    }

    fn delete_shift(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM shift_definitions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Schedule entry operations

    fn get_entry(
        &self,
        team_id: i64,
        person_id: i64,
        day: NaiveDate,
    ) -> Result<Option<ScheduleEntry>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM schedule_entries
                     WHERE team_id = ?1 AND person_id = ?2 AND day = ?3"
                ),
                params![team_id, person_id, format_day(day)],
                entry_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_entries(
        &self,
        team_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM schedule_entries
             WHERE team_id = ?1 AND day >= ?2 AND day <= ?3
             ORDER BY day, person_id"
        ))?;

        let rows = stmt.query_map(
            params![team_id, format_day(start), format_day(end)],
            entry_from_row,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn upsert_entry(
        &self,
        team_id: i64,
        person_id: i64,
        day: NaiveDate,
        shift_code: &str,
        updated_by: i64,
    ) -> Result<ScheduleEntry> {
        let conn = self.conn();

        // Last write wins; there is no version token on cells.
        conn.execute(
            "INSERT INTO schedule_entries (team_id, person_id, day, shift_code, updated_at, \
             updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(team_id, person_id, day)
             DO UPDATE SET shift_code = ?4, updated_at = ?5, updated_by = ?6",
            params![
                team_id,
                person_id,
                format_day(day),
                shift_code,
                format_datetime(&Utc::now()),
                updated_by,
            ],
        )?;

        conn.query_row(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM schedule_entries
                 WHERE team_id = ?1 AND person_id = ?2 AND day = ?3"
            ),
            params![team_id, person_id, format_day(day)],
            entry_from_row,
        )
        .map_err(Error::from)
    }

    fn delete_entry(&self, team_id: i64, person_id: i64, day: NaiveDate) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM schedule_entries WHERE team_id = ?1 AND person_id = ?2 AND day = ?3",
            params![team_id, person_id, format_day(day)],
        )?;
        Ok(rows > 0)
    }
}
