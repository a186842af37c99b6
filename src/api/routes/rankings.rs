use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::ranking::{attach_names, attach_overall_names};
use crate::calculate::{rank_overall, rank_test_type, test_types_with_results};
use crate::models::{OverallRankingRow, RankingRow, RankingScope, TeamId};

#[derive(Debug, Deserialize)]
pub struct RankingsParams {
    /// A test type label, or "overall"
    pub test_type: Option<String>,
    pub team: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RankingEntries {
    TestType(Vec<RankingRow>),
    Overall(Vec<OverallRankingRow>),
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub scope: String,
    pub team_id: Option<String>,
    /// Test types that have at least one result
    pub test_types: Vec<String>,
    pub rankings: RankingEntries,
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingsParams>,
) -> Result<Json<RankingsResponse>, ApiError> {
    let scope = RankingScope::from_filter(params.test_type.as_deref());

    let records = match params.team.as_deref() {
        Some(team_id) => {
            let team_id = TeamId::from(team_id);
            let team = state
                .store
                .team(&team_id)?
                .ok_or_else(|| ApiError::NotFound(format!("team {}", team_id)))?;
            state.store.performances_for_team(&team)?
        }
        None => state.store.performances()?,
    };
    let names = state.store.athlete_names()?;

    let rankings = match &scope {
        RankingScope::Overall => {
            let mut rows = rank_overall(&records);
            attach_overall_names(&mut rows, &names);
            RankingEntries::Overall(rows)
        }
        RankingScope::TestType(test_type) => {
            let mut rows = rank_test_type(&records, test_type);
            attach_names(&mut rows, &names);
            RankingEntries::TestType(rows)
        }
    };

    tracing::debug!("Computed {} ranking over {} records", scope, records.len());

    Ok(Json(RankingsResponse {
        scope: scope.to_string(),
        team_id: params.team,
        test_types: test_types_with_results(&records),
        rankings,
    }))
}
