use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{auth, people, permissions, schedule, shifts, teams};
use crate::auth::SessionSigner;
use crate::config::AppConfig;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub signer: SessionSigner,
    pub config: AppConfig,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/first-login", post(auth::first_login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Team routes
        .route("/teams", get(teams::list_teams))
        // People routes
        .route("/teams/{team_id}/people", get(people::list_people))
        .route("/teams/{team_id}/people", post(people::create_person))
        .route(
            "/teams/{team_id}/people/{person_id}",
            put(people::update_person),
        )
        .route(
            "/teams/{team_id}/people/{person_id}",
            delete(people::delete_person),
        )
        // Shift catalog routes
        .route("/teams/{team_id}/shifts", get(shifts::list_shifts))
        .route("/teams/{team_id}/shifts", post(shifts::create_shift))
        .route(
            "/teams/{team_id}/shifts/{shift_id}",
            put(shifts::update_shift),
        )
        .route(
            "/teams/{team_id}/shifts/{shift_id}",
            delete(shifts::delete_shift),
        )
        // Schedule routes
        .route("/schedule", get(schedule::read_schedule))
        .route("/schedule/cell", put(schedule::update_cell))
        .route("/schedule/export", get(schedule::export_schedule))
        // Permission administration routes
        .route("/permissions/overview", get(permissions::overview))
        .route("/permissions/users", post(permissions::create_user))
        .route(
            "/permissions/users/{user_id}",
            put(permissions::update_user),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
