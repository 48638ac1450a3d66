use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::permissions::UserWithPermissions;
use crate::types::Team;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub must_change_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserWithPermissions>,
}

#[derive(Debug, Deserialize)]
pub struct FirstLoginRequest {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    pub team_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CellUpdateRequest {
    pub team_id: i64,
    pub person_id: i64,
    pub day: NaiveDate,
    #[serde(default)]
    pub shift_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePersonRequest {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub show_in_schedule: bool,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateShiftRequest {
    pub code: String,
    pub display_name: String,
    pub bg_color: String,
    pub text_color: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct PermissionOverview {
    pub users: Vec<UserWithPermissions>,
    pub teams: Vec<Team>,
}

fn default_true() -> bool {
    true
}
