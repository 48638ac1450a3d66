//! The schedule grid: a date-range x person matrix of shift assignments
//! for one team. Reads derive a read_only flag from the caller's
//! permissions; writes enforce a single assignment per (team, person, day)
//! cell, with cleared cells deleted rather than stored empty.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::auth::access;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{AccessLevel, Page, Person, ShiftDefinition, User};

#[derive(Debug, Serialize)]
pub struct TeamView {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub access_level: AccessLevel,
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub person_id: i64,
    pub shift_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GridDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub assignments: Vec<GridCell>,
}

#[derive(Debug, Serialize)]
pub struct Grid {
    pub team: TeamView,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<GridDay>,
    pub people: Vec<Person>,
    pub shifts: Vec<ShiftDefinition>,
    pub read_only: bool,
}

#[derive(Debug, Serialize)]
pub struct CellUpdate {
    pub person_id: i64,
    pub day: NaiveDate,
    pub shift_code: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: i64,
}

fn weekday_name(day: NaiveDate) -> String {
    day.format("%a").to_string()
}

/// Builds the grid for one team over an inclusive date range. Requires
/// page `schedule` view and team read access, checked in that order.
pub fn build_grid(
    store: &dyn Store,
    user: &User,
    team_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Grid> {
    let page = access::require_page(store, user, Page::Schedule, false)?;
    let level = access::require_team(store, user, team_id, AccessLevel::Read)?;

    if start > end {
        return Err(Error::InvalidInput("invalid_range"));
    }

    let team = store.get_team(team_id)?.ok_or(Error::NotFound)?;
    let people = store.list_roster_people(team_id)?;
    let shifts = store.list_shifts(team_id)?;
    let entries = store.list_entries(team_id, start, end)?;

    let lookup: HashMap<(i64, NaiveDate), String> = entries
        .into_iter()
        .map(|entry| ((entry.person_id, entry.day), entry.shift_code))
        .collect();

    // Derivable from the two permission lookups alone, independent of any
    // cell content.
    let read_only = level != AccessLevel::Write || !page.can_edit;

    let days = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| GridDay {
            date: day,
            weekday: weekday_name(day),
            assignments: people
                .iter()
                .map(|person| GridCell {
                    person_id: person.id,
                    shift_code: lookup.get(&(person.id, day)).cloned(),
                })
                .collect(),
        })
        .collect();

    Ok(Grid {
        team: TeamView {
            id: team.id,
            name: team.name,
            code: team.code,
            description: team.description,
            access_level: level,
        },
        start,
        end,
        days,
        people,
        shifts,
        read_only,
    })
}

/// Writes one cell. An empty code clears the cell by deleting the row
/// (clearing an already-empty cell is a successful no-op); a non-empty
/// code must name an active shift of the team and upserts the row. The
/// last write to a cell wins; there is no conflict detection.
pub fn update_cell(
    store: &dyn Store,
    user: &User,
    team_id: i64,
    person_id: i64,
    day: NaiveDate,
    shift_code: Option<&str>,
) -> Result<CellUpdate> {
    access::require_page(store, user, Page::Schedule, true)?;
    access::require_team(store, user, team_id, AccessLevel::Write)?;

    let person = store
        .get_person(person_id)?
        .filter(|p| p.team_id == team_id)
        .ok_or(Error::NotFound)?;

    let code = shift_code.filter(|code| !code.is_empty());

    match code {
        Some(code) => {
            store
                .get_active_shift_by_code(team_id, code)?
                .ok_or(Error::InvalidInput("invalid_shift"))?;

            let entry = store.upsert_entry(team_id, person.id, day, code, user.id)?;
            Ok(CellUpdate {
                person_id: entry.person_id,
                day: entry.day,
                shift_code: Some(entry.shift_code),
                updated_at: entry.updated_at,
                updated_by: entry.updated_by,
            })
        }
        None => {
            store.delete_entry(team_id, person.id, day)?;
            Ok(CellUpdate {
                person_id: person.id,
                day,
                shift_code: None,
                updated_at: Utc::now(),
                updated_by: user.id,
            })
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders an already-built grid as CSV, one row per day and one column
/// per person, using shift display names (falling back to the raw code
/// when the definition no longer exists). Pure projection: no further
/// authorization or queries.
#[must_use]
pub fn export_csv(grid: &Grid) -> String {
    let display_names: HashMap<&str, &str> = grid
        .shifts
        .iter()
        .map(|shift| (shift.code.as_str(), shift.display_name.as_str()))
        .collect();

    let mut out = String::new();

    let mut header = vec!["date".to_string(), "weekday".to_string()];
    header.extend(grid.people.iter().map(|person| csv_field(&person.name)));
    out.push_str(&header.join(","));
    out.push('\n');

    for day in &grid.days {
        let mut row = vec![day.date.to_string(), day.weekday.clone()];
        for cell in &day.assignments {
            let label = cell
                .shift_code
                .as_deref()
                .map(|code| display_names.get(code).copied().unwrap_or(code))
                .unwrap_or("");
            row.push(csv_field(label));
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::{PageGrant, ShiftDefinition, Team, TeamGrant, UserUpdate};

    struct Fixture {
        store: SqliteStore,
        team: Team,
        alice: Person,
        bob: Person,
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn fixture() -> Fixture {
        let store = SqliteStore::new(":memory:").unwrap();
        store.initialize().unwrap();
        let now = Utc::now();

        let team = store
            .create_team(&Team {
                id: 0,
                name: "Operations".to_string(),
                code: "ops".to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        for (code, name, order) in [("DAY", "Day shift", 1), ("OFF", "Off", 2)] {
            store
                .create_shift(&ShiftDefinition {
                    id: 0,
                    team_id: team.id,
                    code: code.to_string(),
                    display_name: name.to_string(),
                    bg_color: "#facc15".to_string(),
                    text_color: "#1f2937".to_string(),
                    sort_order: order,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .unwrap();
        }

        let alice = store
            .create_person(&Person {
                id: 0,
                team_id: team.id,
                name: "Alice".to_string(),
                active: true,
                show_in_schedule: true,
                sort_index: 1,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        let bob = store
            .create_person(&Person {
                id: 0,
                team_id: team.id,
                name: "Bob".to_string(),
                active: true,
                show_in_schedule: true,
                sort_index: 2,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        Fixture {
            store,
            team,
            alice,
            bob,
        }
    }

    fn make_user(
        fixture: &Fixture,
        username: &str,
        can_edit: bool,
        level: AccessLevel,
    ) -> User {
        let now = Utc::now();
        let user = fixture
            .store
            .create_user(&User {
                id: 0,
                username: username.to_string(),
                display_name: username.to_string(),
                password_hash: "$argon2id$test".to_string(),
                must_change_password: false,
                is_active: true,
                token_version: 1,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        fixture
            .store
            .apply_user_update(
                user.id,
                &UserUpdate {
                    pages: vec![PageGrant {
                        page: Page::Schedule,
                        can_view: true,
                        can_edit,
                    }],
                    teams: vec![TeamGrant {
                        team_id: fixture.team.id,
                        access_level: Some(level),
                    }],
                    ..Default::default()
                },
            )
            .unwrap();
        user
    }

    #[test]
    fn test_three_day_range_inclusive_ascending() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);

        let grid = build_grid(
            &f.store,
            &user,
            f.team.id,
            day("2024-01-01"),
            day("2024-01-03"),
        )
        .unwrap();

        assert_eq!(grid.days.len(), 3);
        assert_eq!(grid.days[0].date, day("2024-01-01"));
        assert_eq!(grid.days[1].date, day("2024-01-02"));
        assert_eq!(grid.days[2].date, day("2024-01-03"));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);

        let result = build_grid(
            &f.store,
            &user,
            f.team.id,
            day("2024-01-03"),
            day("2024-01-01"),
        );
        assert!(matches!(result, Err(Error::InvalidInput("invalid_range"))));
    }

    #[test]
    fn test_assign_then_clear_cell() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);
        let d = day("2024-01-01");

        update_cell(&f.store, &user, f.team.id, f.alice.id, d, Some("DAY")).unwrap();

        let grid = build_grid(&f.store, &user, f.team.id, d, d).unwrap();
        assert_eq!(grid.days.len(), 1);
        let cells = &grid.days[0].assignments;
        assert_eq!(cells[0].person_id, f.alice.id);
        assert_eq!(cells[0].shift_code.as_deref(), Some("DAY"));
        assert_eq!(cells[1].person_id, f.bob.id);
        assert_eq!(cells[1].shift_code, None);

        let cleared = update_cell(&f.store, &user, f.team.id, f.alice.id, d, Some("")).unwrap();
        assert_eq!(cleared.shift_code, None);
        assert!(f.store.get_entry(f.team.id, f.alice.id, d).unwrap().is_none());

        let grid = build_grid(&f.store, &user, f.team.id, d, d).unwrap();
        assert_eq!(grid.days[0].assignments[0].shift_code, None);
    }

    #[test]
    fn test_clear_empty_cell_is_noop_success() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);

        let result =
            update_cell(&f.store, &user, f.team.id, f.alice.id, day("2024-01-01"), None).unwrap();
        assert_eq!(result.shift_code, None);
    }

    #[test]
    fn test_unknown_shift_rejected() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);

        let result = update_cell(
            &f.store,
            &user,
            f.team.id,
            f.alice.id,
            day("2024-01-01"),
            Some("NOPE"),
        );
        assert!(matches!(result, Err(Error::InvalidInput("invalid_shift"))));
    }

    #[test]
    fn test_inactive_shift_rejected() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);

        let shifts = f.store.list_shifts(f.team.id).unwrap();
        let off = shifts.iter().find(|s| s.code == "OFF").unwrap();
        f.store
            .update_shift(
                off.id,
                &crate::types::ShiftPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let result = update_cell(
            &f.store,
            &user,
            f.team.id,
            f.alice.id,
            day("2024-01-01"),
            Some("OFF"),
        );
        assert!(matches!(result, Err(Error::InvalidInput("invalid_shift"))));
    }

    #[test]
    fn test_person_outside_team_not_found() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);
        let now = Utc::now();

        let other = f
            .store
            .create_team(&Team {
                id: 0,
                name: "Support".to_string(),
                code: "support".to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        let stranger = f
            .store
            .create_person(&Person {
                id: 0,
                team_id: other.id,
                name: "Stranger".to_string(),
                active: true,
                show_in_schedule: true,
                sort_index: 1,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let result = update_cell(
            &f.store,
            &user,
            f.team.id,
            stranger.id,
            day("2024-01-01"),
            Some("DAY"),
        );
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn test_team_read_level_gates_writes() {
        // Page edit capability alone is not enough: the team access level
        // gates writes independently.
        let f = fixture();
        let user = make_user(&f, "editor", true, AccessLevel::Read);

        let result = update_cell(
            &f.store,
            &user,
            f.team.id,
            f.alice.id,
            day("2024-01-01"),
            Some("DAY"),
        );
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[test]
    fn test_read_only_matrix() {
        let f = fixture();
        let d = day("2024-01-01");

        let cases = [
            ("w-edit", true, AccessLevel::Write, false),
            ("w-view", false, AccessLevel::Write, true),
            ("r-edit", true, AccessLevel::Read, true),
            ("r-view", false, AccessLevel::Read, true),
        ];
        for (username, can_edit, level, expected) in cases {
            let user = make_user(&f, username, can_edit, level);
            let grid = build_grid(&f.store, &user, f.team.id, d, d).unwrap();
            assert_eq!(
                grid.read_only, expected,
                "read_only for can_edit={can_edit}, level={level}"
            );
        }
    }

    #[test]
    fn test_export_uses_display_names() {
        let f = fixture();
        let user = make_user(&f, "planner", true, AccessLevel::Write);
        let d = day("2024-01-01");

        update_cell(&f.store, &user, f.team.id, f.alice.id, d, Some("DAY")).unwrap();

        let grid = build_grid(&f.store, &user, f.team.id, d, d).unwrap();
        let csv = export_csv(&grid);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "date,weekday,Alice,Bob");
        assert!(lines[1].starts_with("2024-01-01,Mon,Day shift,"));
    }

    #[test]
    fn test_export_quotes_awkward_names() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("has,comma"), "\"has,comma\"");
        assert_eq!(csv_field("has\"quote"), "\"has\"\"quote\"");
    }
}
