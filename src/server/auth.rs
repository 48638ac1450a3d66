use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::{CredentialHasher, CurrentUser};
use crate::permissions::{self, UserWithPermissions};
use crate::server::AppState;
use crate::server::dto::{FirstLoginRequest, LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .store
        .get_user_by_username(&req.username)?
        .filter(|u| u.is_active)
        .ok_or_else(ApiError::unauthenticated)?;

    let hasher = CredentialHasher::new();
    if !hasher.verify(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthenticated());
    }

    // No session is issued until the forced password change is done.
    if user.must_change_password {
        return Ok(Json(ApiResponse::success(LoginResponse {
            must_change_password: true,
            token: None,
            user: None,
        })));
    }

    let token = state.signer.issue(user.id, user.token_version)?;
    let resolved = permissions::resolve_user(state.store.as_ref(), &user)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        must_change_password: false,
        token: Some(token),
        user: Some(resolved),
    })))
}

pub async fn first_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FirstLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut user = state
        .store
        .get_user_by_username(&req.username)?
        .filter(|u| u.is_active)
        .ok_or_else(ApiError::unauthenticated)?;

    if !user.must_change_password {
        return Err(ApiError::bad_request("invalid_state"));
    }

    let hasher = CredentialHasher::new();
    if !hasher.verify(&req.current_password, &user.password_hash)? {
        return Err(ApiError::unauthenticated());
    }

    user.password_hash = hasher.hash(&req.new_password)?;
    user.must_change_password = false;
    user.token_version += 1;
    state.store.update_user(&user)?;

    let token = state.signer.issue(user.id, user.token_version)?;
    let resolved = permissions::resolve_user(state.store.as_ref(), &user)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        must_change_password: false,
        token: Some(token),
        user: Some(resolved),
    })))
}

pub async fn logout(_user: CurrentUser) -> Json<ApiResponse<serde_json::Value>> {
    // Sessions are stateless; the client discards the token.
    Json(ApiResponse::success(serde_json::json!({ "success": true })))
}

pub async fn me(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<UserWithPermissions>>, ApiError> {
    let resolved = permissions::resolve_user(state.store.as_ref(), &user)?;
    Ok(Json(ApiResponse::success(resolved)))
}
