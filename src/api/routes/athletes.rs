use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{AthleteSummary, TeamId};

#[derive(Debug, Serialize)]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub member_count: u32,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

pub async fn list_teams(State(state): State<AppState>) -> Result<Json<TeamsResponse>, ApiError> {
    let mut teams: Vec<TeamSummary> = state
        .store
        .teams()?
        .into_iter()
        .map(|t| TeamSummary {
            id: t.id.to_string(),
            name: t.name,
            member_count: t.members.len() as u32,
        })
        .collect();
    teams.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(TeamsResponse { teams }))
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub team: TeamSummary,
    pub athletes: Vec<AthleteSummary>,
}

pub async fn team_athletes(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<RosterResponse>, ApiError> {
    let team_id = TeamId::from(team_id);
    let team = state
        .store
        .team(&team_id)?
        .ok_or_else(|| ApiError::NotFound(format!("team {}", team_id)))?;
    let athletes = state.store.roster(&team_id)?.unwrap_or_default();

    Ok(Json(RosterResponse {
        team: TeamSummary {
            id: team.id.to_string(),
            name: team.name,
            member_count: team.members.len() as u32,
        },
        athletes,
    }))
}
