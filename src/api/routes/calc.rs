use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::calculate::{
    self, format_split, is_valid_time, parse_time_str, watts_from_split, PieceMetrics,
};

// ── Time -> split/watts ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SplitParams {
    pub time: String,
    pub test_type: String,
}

pub async fn split(Query(params): Query<SplitParams>) -> Result<Json<PieceMetrics>, ApiError> {
    let seconds = parse_time_str(&params.time);
    if !is_valid_time(seconds) {
        return Err(ApiError::BadRequest(format!(
            "Unreadable time: {:?}",
            params.time
        )));
    }

    Ok(Json(PieceMetrics::from_seconds(seconds, &params.test_type)))
}

// ── Split -> watts ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WattsParams {
    /// Split as `M:SS.s` or seconds
    pub split: String,
}

#[derive(Debug, Serialize)]
pub struct PowerResponse {
    pub split: f64,
    pub split_display: String,
    pub watts: u32,
}

pub async fn watts(Query(params): Query<WattsParams>) -> Result<Json<PowerResponse>, ApiError> {
    let split = parse_time_str(&params.split);
    let watts = watts_from_split(split)
        .ok_or_else(|| ApiError::BadRequest(format!("Unreadable split: {:?}", params.split)))?;

    Ok(Json(PowerResponse {
        split,
        split_display: format_split(Some(split)),
        watts,
    }))
}

// ── Watts -> split ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SplitFromWattsParams {
    pub watts: f64,
}

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub watts: f64,
    pub split: f64,
    pub split_display: String,
}

pub async fn split_from_watts(
    Query(params): Query<SplitFromWattsParams>,
) -> Result<Json<SplitResponse>, ApiError> {
    let split = calculate::split_from_watts(params.watts)
        .ok_or_else(|| ApiError::BadRequest("watts must be a positive number".to_string()))?;

    Ok(Json(SplitResponse {
        watts: params.watts,
        split,
        split_display: format_split(Some(split)),
    }))
}
