use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::grid::TeamView;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

/// Lists the teams the caller holds a team permission on, with the
/// caller's access level, ordered by team name.
pub async fn list_teams(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TeamView>>>, ApiError> {
    let mut teams = Vec::new();
    for perm in state.store.list_team_permissions(user.id)? {
        let Some(team) = state.store.get_team(perm.team_id)? else {
            continue;
        };
        teams.push(TeamView {
            id: team.id,
            name: team.name,
            code: team.code,
            description: team.description,
            access_level: perm.access_level,
        });
    }
    teams.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(ApiResponse::success(teams)))
}
