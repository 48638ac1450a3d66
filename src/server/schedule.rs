use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::auth::CurrentUser;
use crate::grid::{self, CellUpdate, Grid};
use crate::server::AppState;
use crate::server::dto::{CellUpdateRequest, ScheduleParams};
use crate::server::response::{ApiError, ApiResponse};

pub async fn read_schedule(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<ApiResponse<Grid>>, ApiError> {
    let grid = grid::build_grid(
        state.store.as_ref(),
        &user,
        params.team_id,
        params.start,
        params.end,
    )?;
    Ok(Json(ApiResponse::success(grid)))
}

pub async fn update_cell(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CellUpdateRequest>,
) -> Result<Json<ApiResponse<CellUpdate>>, ApiError> {
    let updated = grid::update_cell(
        state.store.as_ref(),
        &user,
        req.team_id,
        req.person_id,
        req.day,
        req.shift_code.as_deref(),
    )?;
    Ok(Json(ApiResponse::success(updated)))
}

/// CSV projection of the same read path as `read_schedule`; no extra
/// authorization or queries beyond building the grid.
pub async fn export_schedule(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduleParams>,
) -> Result<impl IntoResponse, ApiError> {
    let grid = grid::build_grid(
        state.store.as_ref(),
        &user,
        params.team_id,
        params.start,
        params.end,
    )?;
    let csv = grid::export_csv(&grid);

    let filename = format!(
        "schedule_{}_{}_{}.csv",
        params.team_id, params.start, params.end
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        csv,
    ))
}
