use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;
use crate::types::User;

/// Extractor that requires a valid session. Session validity is
/// re-evaluated on every call: the token's embedded version must still
/// match the stored token_version, so a credential rotation takes effect
/// immediately.
pub struct CurrentUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::InternalError => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"rosterd\"".parse().unwrap(),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.strip_prefix("Bearer ").unwrap()
            }
            Some(_) => return Err(AuthError::InvalidScheme),
            None => return Err(AuthError::MissingAuth),
        };

        let claims = state
            .signer
            .verify(raw_token)
            .ok_or(AuthError::InvalidToken)?;

        let user = state
            .store
            .get_user(claims.sub)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active || user.token_version != claims.ver {
            return Err(AuthError::InvalidToken);
        }

        Ok(CurrentUser(user))
    }
}
