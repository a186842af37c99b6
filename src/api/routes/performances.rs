use std::collections::{BTreeMap, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::calculate::{PieceMetrics, TimeValue};
use crate::models::{normalize_test_type, AthleteId, AthleteSummary, PerformanceRecord};

// ── Athlete history ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub test_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PerformanceEntry {
    #[serde(flatten)]
    pub record: PerformanceRecord,
    pub metrics: PieceMetrics,
    pub is_personal_best: bool,
}

#[derive(Debug, Serialize)]
pub struct PersonalBest {
    pub record_id: String,
    pub date: NaiveDate,
    pub metrics: PieceMetrics,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub athlete: AthleteSummary,
    pub performances: Vec<PerformanceEntry>,
    pub personal_bests: BTreeMap<String, PersonalBest>,
    pub pagination: PaginationMeta,
}

/// Personal-best record per normalized test type.
fn best_records(records: &[PerformanceRecord]) -> HashMap<String, &PerformanceRecord> {
    let mut bests: HashMap<String, &PerformanceRecord> = HashMap::new();
    for record in records.iter().filter(|r| r.is_completed()) {
        bests
            .entry(normalize_test_type(&record.test_type))
            .and_modify(|best| {
                if record.seconds() < best.seconds() {
                    *best = record;
                }
            })
            .or_insert(record);
    }
    bests
}

pub async fn athlete_performances(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let athlete_id = AthleteId::from(athlete_id);
    let profile = state
        .store
        .athlete(&athlete_id)?
        .ok_or_else(|| ApiError::NotFound(format!("athlete {}", athlete_id)))?;

    let mut records = state.store.performances_for(&athlete_id)?;
    if let Some(test_type) = params.test_type.as_deref() {
        records.retain(|r| r.matches_test_type(test_type));
    }
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let (personal_bests, best_ids) = {
        let bests = best_records(&records);
        let personal_bests: BTreeMap<String, PersonalBest> = bests
            .iter()
            .map(|(test_type, record)| {
                (
                    test_type.clone(),
                    PersonalBest {
                        record_id: record.id.to_string(),
                        date: record.date,
                        metrics: PieceMetrics::derive(record.time.as_ref(), &record.test_type),
                    },
                )
            })
            .collect();
        let best_ids: Vec<String> = bests.values().map(|r| r.id.to_string()).collect();
        (personal_bests, best_ids)
    };

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, records.len() as u32);

    let performances = pagination
        .apply(records)
        .into_iter()
        .map(|record| PerformanceEntry {
            metrics: PieceMetrics::derive(record.time.as_ref(), &record.test_type),
            is_personal_best: best_ids.contains(&record.id.to_string()),
            record,
        })
        .collect();

    Ok(Json(HistoryResponse {
        athlete: AthleteSummary::from(&profile),
        performances,
        personal_bests,
        pagination: meta,
    }))
}

// ── Logging a piece ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewPerformance {
    pub athlete_id: String,
    pub test_type: String,
    #[serde(default)]
    pub time: Option<TimeValue>,
    pub date: Option<NaiveDate>,
    pub split: Option<String>,
    pub watts: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPerformance {
    pub record: PerformanceRecord,
    pub metrics: PieceMetrics,
    pub completed: bool,
    /// False when an identical record was already stored
    pub created: bool,
}

pub async fn create_performance(
    State(state): State<AppState>,
    Json(body): Json<NewPerformance>,
) -> Result<(StatusCode, Json<CreatedPerformance>), ApiError> {
    if body.test_type.trim().is_empty() {
        return Err(ApiError::BadRequest("test_type is required".to_string()));
    }

    let athlete_id = AthleteId::from(body.athlete_id);
    if state.store.athlete(&athlete_id)?.is_none() {
        return Err(ApiError::NotFound(format!("athlete {}", athlete_id)));
    }

    let date = body
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let mut record =
        PerformanceRecord::new(athlete_id, body.test_type.trim().to_string(), body.time, date);
    if let Some(split) = body.split {
        record = record.with_split(split);
    }
    if let Some(watts) = body.watts {
        record = record.with_watts(watts);
    }
    if let Some(notes) = body.notes {
        record = record.with_notes(notes);
    }

    let created = state.store.add_performance(&record)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(CreatedPerformance {
            metrics: PieceMetrics::derive(record.time.as_ref(), &record.test_type),
            completed: record.is_completed(),
            created,
            record,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, post_json, seed_team, setup_test_state};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_performance() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        let body = json!({
            "athlete_id": ana.id.as_str(),
            "test_type": "2k",
            "time": "6:40.0",
            "date": "2026-03-01"
        });
        let app = build_router(state.clone(), "*");
        let (status, json) = post_json(app, "/api/performances", body.clone()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["completed"], true);
        assert_eq!(json["metrics"]["split_display"], "1:40.0");
        assert_eq!(json["metrics"]["watts"], 350);

        let (status, json) = post_json(build_router(state, "*"), "/api/performances", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["created"], false);
    }

    #[tokio::test]
    async fn test_create_incomplete_performance() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        let body = json!({
            "athlete_id": ana.id.as_str(),
            "test_type": "6k",
            "time": "--:--.-",
            "date": "2026-03-01"
        });
        let (status, json) = post_json(build_router(state, "*"), "/api/performances", body).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["completed"], false);
        assert!(json["metrics"]["watts"].is_null());
    }

    #[tokio::test]
    async fn test_create_performance_unknown_athlete() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let body = json!({"athlete_id": "nobody", "test_type": "2k", "time": 400.0});
        let (status, _) = post_json(build_router(state, "*"), "/api/performances", body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_performance_requires_test_type() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        let body = json!({"athlete_id": ana.id.as_str(), "test_type": "  ", "time": 400.0});
        let (status, json) = post_json(build_router(state, "*"), "/api/performances", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_athlete_history_marks_personal_bests() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        for (test_type, time, date) in [
            ("2k", json!("6:45.0"), "2026-01-10"),
            ("2k", json!(392.5), "2026-02-10"),
            ("6k", json!("21:30.0"), "2026-02-20"),
            ("2k", json!("--:--.-"), "2026-03-01"),
        ] {
            let body = json!({
                "athlete_id": ana.id.as_str(),
                "test_type": test_type,
                "time": time,
                "date": date
            });
            post_json(build_router(state.clone(), "*"), "/api/performances", body).await;
        }

        let uri = format!("/api/athletes/{}/performances", ana.id);
        let (status, json) = get_json(build_router(state, "*"), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["athlete"]["name"], "Ana");
        let performances = json["performances"].as_array().unwrap();
        assert_eq!(performances.len(), 4);
        // Newest first
        assert_eq!(performances[0]["date"], "2026-03-01");
        assert_eq!(performances[0]["is_personal_best"], false);
        assert_eq!(performances[2]["date"], "2026-02-10");
        assert_eq!(performances[2]["is_personal_best"], true);
        assert_eq!(json["personal_bests"]["2k"]["metrics"]["time_display"], "6:32.5");
        assert_eq!(json["personal_bests"]["6k"]["date"], "2026-02-20");
        assert_eq!(json["pagination"]["total_items"], 4);
    }

    #[tokio::test]
    async fn test_athlete_history_filter_and_page() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        for day in 1..=5u32 {
            let time = 400.0 - f64::from(day);
            let body = json!({
                "athlete_id": ana.id.as_str(),
                "test_type": "2k",
                "time": time,
                "date": format!("2026-03-0{}", day)
            });
            post_json(build_router(state.clone(), "*"), "/api/performances", body).await;
        }
        let body = json!({
            "athlete_id": ana.id.as_str(),
            "test_type": "6k",
            "time": 1320.0,
            "date": "2026-03-09"
        });
        post_json(build_router(state.clone(), "*"), "/api/performances", body).await;

        let uri = format!(
            "/api/athletes/{}/performances?test_type=2K&page=2&page_size=2",
            ana.id
        );
        let (status, json) = get_json(build_router(state, "*"), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pagination"]["total_items"], 5);
        assert_eq!(json["pagination"]["total_pages"], 3);
        let performances = json["performances"].as_array().unwrap();
        assert_eq!(performances.len(), 2);
        assert_eq!(performances[0]["date"], "2026-03-03");
    }

    #[tokio::test]
    async fn test_athlete_history_page_past_the_end() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let (_, ana, _, _) = seed_team(&state);

        let body = json!({
            "athlete_id": ana.id.as_str(),
            "test_type": "2k",
            "time": "6:40.0",
            "date": "2026-03-01"
        });
        post_json(build_router(state.clone(), "*"), "/api/performances", body).await;

        let uri = format!(
            "/api/athletes/{}/performances?page=4294967295&page_size=100",
            ana.id
        );
        let (status, json) = get_json(build_router(state, "*"), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["performances"].as_array().unwrap().is_empty());
        assert_eq!(json["pagination"]["total_items"], 1);
        assert_eq!(json["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_athlete_history_unknown_athlete() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let app = build_router(state, "*");
        let (status, _) = get_json(app, "/api/athletes/nobody/performances").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
