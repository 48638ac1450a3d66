use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AccessLevel, Page};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub must_change_password: bool,
    pub is_active: bool,
    /// Bumped on credential rotation; sessions carrying an older version
    /// are rejected.
    pub token_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's view/edit capability for one page. At most one row per
/// (user, page); `can_edit` never holds without `can_view`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePermission {
    pub user_id: i64,
    pub page: Page,
    pub can_view: bool,
    pub can_edit: bool,
}

/// A user's access level on one team. At most one row per (user, team).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPermission {
    pub user_id: i64,
    pub team_id: i64,
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub team_id: i64,
    pub name: String,
    pub active: bool,
    pub show_in_schedule: bool,
    pub sort_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: i64,
    pub team_id: i64,
    pub code: String,
    pub display_name: String,
    pub bg_color: String,
    pub text_color: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One grid cell: the assignment of a shift code to (team, person, day).
/// Cleared cells are deleted rather than stored with an empty code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub team_id: i64,
    pub person_id: i64,
    pub day: NaiveDate,
    pub shift_code: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: i64,
}

/// Partial update for a person; each field is applied only when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub show_in_schedule: Option<bool>,
    #[serde(default)]
    pub sort_index: Option<i64>,
}

/// Partial update for a shift definition; each field is applied only when
/// present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftPatch {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Desired page capability used during permission reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct PageGrant {
    pub page: Page,
    pub can_view: bool,
    pub can_edit: bool,
}

/// Desired team access used during permission reconciliation. An absent
/// level removes any existing permission for that team.
#[derive(Debug, Clone, Copy)]
pub struct TeamGrant {
    pub team_id: i64,
    pub access_level: Option<AccessLevel>,
}

/// The full desired state applied by one reconciliation call. `pages` and
/// `teams` are complete sets: anything not listed is removed.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    /// Already hashed. Rotating credentials clears `must_change_password`
    /// and increments `token_version`.
    pub password_hash: Option<String>,
    pub pages: Vec<PageGrant>,
    pub teams: Vec<TeamGrant>,
}
