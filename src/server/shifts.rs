use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::auth::{CurrentUser, access};
use crate::server::AppState;
use crate::server::dto::CreateShiftRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{AccessLevel, Page, ShiftDefinition, ShiftPatch};

pub async fn list_shifts(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ShiftDefinition>>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Settings, false)?;
    access::require_team(store, &user, team_id, AccessLevel::Read)?;

    let shifts = store.list_shifts(team_id)?;
    Ok(Json(ApiResponse::success(shifts)))
}

pub async fn create_shift(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
    Json(req): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShiftDefinition>>), ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Settings, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let now = Utc::now();
    let shift = store.create_shift(&ShiftDefinition {
        id: 0,
        team_id,
        code: req.code,
        display_name: req.display_name,
        bg_color: req.bg_color,
        text_color: req.text_color,
        sort_order: req.sort_order,
        is_active: req.is_active,
        created_at: now,
        updated_at: now,
    })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(shift))))
}

pub async fn update_shift(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((team_id, shift_id)): Path<(i64, i64)>,
    Json(patch): Json<ShiftPatch>,
) -> Result<Json<ApiResponse<ShiftDefinition>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Settings, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let shift = store
        .get_shift(shift_id)?
        .filter(|s| s.team_id == team_id)
        .ok_or_else(|| ApiError::not_found("not_found"))?;

    let updated = store.update_shift(shift.id, &patch)?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Deleting a definition never touches historical schedule entries; they
/// reference the catalog by code string only.
pub async fn delete_shift(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((team_id, shift_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Settings, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let shift = store
        .get_shift(shift_id)?
        .filter(|s| s.team_id == team_id)
        .ok_or_else(|| ApiError::not_found("not_found"))?;

    store.delete_shift(shift.id)?;
    Ok(StatusCode::NO_CONTENT)
}
