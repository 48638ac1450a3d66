//! Demo dataset used by `rosterd admin init --demo-data`: two teams with
//! shift catalogs and people, a planner and a viewer account, and a few
//! pre-filled grid cells.

use chrono::{Datelike, Duration, Utc};

use crate::auth::CredentialHasher;
use crate::error::Result;
use crate::permissions::{
    self, NewUser, PageAssignment, PermissionUpdate, TeamAssignment,
};
use crate::store::Store;
use crate::types::{Page, Person, ShiftDefinition, Team};

fn page(page: Page, can_view: bool, can_edit: bool) -> PageAssignment {
    PageAssignment {
        page: page.as_str().to_string(),
        can_view,
        can_edit,
    }
}

fn team_write(team_id: i64) -> TeamAssignment {
    TeamAssignment {
        team_id,
        access_level: Some("write".to_string()),
    }
}

fn make_team(store: &dyn Store, name: &str, code: &str, description: &str) -> Result<Team> {
    let now = Utc::now();
    store.create_team(&Team {
        id: 0,
        name: name.to_string(),
        code: code.to_string(),
        description: Some(description.to_string()),
        created_at: now,
        updated_at: now,
    })
}

fn make_shifts(store: &dyn Store, team_id: i64, shifts: &[(&str, &str, &str, &str, i64)]) -> Result<()> {
    let now = Utc::now();
    for (code, name, bg, text, order) in shifts {
        store.create_shift(&ShiftDefinition {
            id: 0,
            team_id,
            code: (*code).to_string(),
            display_name: (*name).to_string(),
            bg_color: (*bg).to_string(),
            text_color: (*text).to_string(),
            sort_order: *order,
            is_active: true,
            created_at: now,
            updated_at: now,
        })?;
    }
    Ok(())
}

fn make_people(store: &dyn Store, team_id: i64, names: &[&str]) -> Result<Vec<Person>> {
    let now = Utc::now();
    let mut people = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        people.push(store.create_person(&Person {
            id: 0,
            team_id,
            name: (*name).to_string(),
            active: true,
            show_in_schedule: true,
            sort_index: idx as i64 + 1,
            created_at: now,
            updated_at: now,
        })?);
    }
    Ok(people)
}

/// Seeds the demo dataset and grants the given admin account full page
/// capability plus write access on both demo teams.
pub fn seed_demo(store: &dyn Store, hasher: &CredentialHasher, admin_id: i64) -> Result<()> {
    let ops = make_team(store, "Operations", "ops", "Day-to-day operations")?;
    let support = make_team(store, "Support", "support", "Customer support")?;

    make_shifts(
        store,
        ops.id,
        &[
            ("DAY", "Day", "#facc15", "#1f2937", 1),
            ("SWING", "Swing", "#60a5fa", "#0f172a", 2),
            ("NIGHT", "Night", "#818cf8", "#111827", 3),
            ("OFF", "Off", "#d1d5db", "#374151", 4),
        ],
    )?;
    make_shifts(
        store,
        support.id,
        &[
            ("MORNING", "Morning", "#34d399", "#064e3b", 1),
            ("EVENING", "Evening", "#f472b6", "#831843", 2),
            ("OFF", "Off", "#d1d5db", "#374151", 3),
        ],
    )?;

    let ops_people = make_people(store, ops.id, &["Alice", "Bob", "Carol"])?;
    let support_people = make_people(store, support.id, &["Dana", "Eli", "Fran"])?;

    permissions::apply_permission_update(
        store,
        hasher,
        admin_id,
        &PermissionUpdate {
            pages: Page::ALL.iter().map(|p| page(*p, true, true)).collect(),
            teams: vec![team_write(ops.id), team_write(support.id)],
            ..Default::default()
        },
    )?;

    let planner = permissions::create_user_with_permissions(
        store,
        hasher,
        &NewUser {
            username: "planner".to_string(),
            display_name: "Shift Planner".to_string(),
            password: "planner123".to_string(),
            must_change_password: false,
            pages: vec![
                page(Page::Schedule, true, true),
                page(Page::People, true, true),
                page(Page::Settings, true, true),
            ],
            teams: vec![team_write(ops.id)],
        },
    )?;

    permissions::create_user_with_permissions(
        store,
        hasher,
        &NewUser {
            username: "viewer".to_string(),
            display_name: "Schedule Viewer".to_string(),
            password: "viewer123".to_string(),
            must_change_password: false,
            pages: vec![page(Page::Schedule, true, false)],
            teams: vec![TeamAssignment {
                team_id: support.id,
                access_level: Some("read".to_string()),
            }],
        },
    )?;

    let month_start = Utc::now()
        .date_naive()
        .with_day(1)
        .expect("first of month is always valid");

    for (idx, person) in ops_people.iter().enumerate() {
        let code = if idx % 2 == 0 { "DAY" } else { "SWING" };
        store.upsert_entry(
            ops.id,
            person.id,
            month_start + Duration::days(idx as i64),
            code,
            admin_id,
        )?;
    }
    for (idx, person) in support_people.iter().enumerate() {
        let code = if idx % 2 == 0 { "MORNING" } else { "EVENING" };
        store.upsert_entry(
            support.id,
            person.id,
            month_start + Duration::days(idx as i64),
            code,
            planner.id,
        )?;
    }

    Ok(())
}
