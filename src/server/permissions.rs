use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::{CredentialHasher, CurrentUser, access};
use crate::permissions::{
    self, NewUser, PermissionUpdate, UserWithPermissions,
};
use crate::server::AppState;
use crate::server::dto::PermissionOverview;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::Page;

pub async fn overview(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PermissionOverview>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Permissions, false)?;

    let mut users = Vec::new();
    for u in store.list_users()? {
        users.push(permissions::resolve_user(store, &u)?);
    }
    let teams = store.list_teams()?;

    Ok(Json(ApiResponse::success(PermissionOverview {
        users,
        teams,
    })))
}

pub async fn create_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserWithPermissions>>), ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Permissions, true)?;

    let hasher = CredentialHasher::new();
    let created = permissions::create_user_with_permissions(store, &hasher, &req)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<PermissionUpdate>,
) -> Result<Json<ApiResponse<UserWithPermissions>>, ApiError> {
    let store = state.store.as_ref();
    access::require_page(store, &user, Page::Permissions, true)?;

    let hasher = CredentialHasher::new();
    let updated = permissions::apply_permission_update(store, &hasher, user_id, &req)?;

    Ok(Json(ApiResponse::success(updated)))
}
