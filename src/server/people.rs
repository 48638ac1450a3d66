use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::auth::{CurrentUser, access};
use crate::server::AppState;
use crate::server::dto::CreatePersonRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{AccessLevel, Page, Person, PersonPatch};

pub async fn list_people(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Person>>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::People, false)?;
    access::require_team(store, &user, team_id, AccessLevel::Read)?;

    let people = store.list_people(team_id)?;
    Ok(Json(ApiResponse::success(people)))
}

pub async fn create_person(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
    Json(req): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Person>>), ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::People, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let now = Utc::now();
    let person = store.create_person(&Person {
        id: 0,
        team_id,
        name: req.name,
        active: req.active,
        show_in_schedule: req.show_in_schedule,
        sort_index: req.sort_index,
        created_at: now,
        updated_at: now,
    })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(person))))
}

pub async fn update_person(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((team_id, person_id)): Path<(i64, i64)>,
    Json(patch): Json<PersonPatch>,
) -> Result<Json<ApiResponse<Person>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::People, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let person = store
        .get_person(person_id)?
        .filter(|p| p.team_id == team_id)
        .ok_or_else(|| ApiError::not_found("not_found"))?;

    let updated = store.update_person(person.id, &patch)?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_person(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((team_id, person_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::People, true)?;
    access::require_team(store, &user, team_id, AccessLevel::Write)?;

    let person = store
        .get_person(person_id)?
        .filter(|p| p.team_id == team_id)
        .ok_or_else(|| ApiError::not_found("not_found"))?;

    store.delete_person(person.id)?;
    Ok(StatusCode::NO_CONTENT)
}
