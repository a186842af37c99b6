//! REST API endpoints.
//!
//! Axum-based HTTP API for logging performances, browsing rosters,
//! team rankings and split/watts conversion.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            other => {
                tracing::error!("Storage error: {}", other);
                ApiError::Internal("Failed to load team data".to_string())
            }
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(50).clamp(1, 100),
        }
    }

    /// Items skipped before this page; saturates for huge page numbers.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    /// The slice of `items` on this page.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect()
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// CORS policy for a configured origin; `"*"` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            layer
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/teams", get(routes::athletes::list_teams))
        .route(
            "/api/teams/:team_id/athletes",
            get(routes::athletes::team_athletes),
        )
        .route(
            "/api/athletes/:athlete_id/performances",
            get(routes::performances::athlete_performances),
        )
        .route(
            "/api/performances",
            post(routes::performances::create_performance),
        )
        .route("/api/rankings", get(routes::rankings::rankings))
        .route("/api/calc/split", get(routes::calc::split))
        .route("/api/calc/watts", get(routes::calc::watts))
        .route(
            "/api/calc/split-from-watts",
            get(routes::calc::split_from_watts),
        )
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::util::ServiceExt;

    use crate::api::routes::test_support::setup_test_state;

    async fn allowed_origin(cors_origin: &str, request_origin: &str) -> Option<String> {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()), cors_origin);

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, request_origin)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let allowed = allowed_origin("*", "https://elsewhere.example").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_cors_exact_origin() {
        let allowed = allowed_origin("https://club.example", "https://club.example").await;
        assert_eq!(allowed.as_deref(), Some("https://club.example"));

        let other = allowed_origin("https://club.example", "https://elsewhere.example").await;
        assert_eq!(other, None);
    }

    #[test]
    fn test_pagination_default() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 50);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(Some(0), Some(50));
        assert_eq!(p.page, 1);

        let p = Pagination::new(Some(1), Some(200));
        assert_eq!(p.page_size, 100);
    }

    #[test]
    fn test_pagination_apply() {
        let p = Pagination::new(Some(2), Some(3));
        assert_eq!(p.apply((1..=8).collect::<Vec<i32>>()), vec![4, 5, 6]);

        let p = Pagination::new(Some(4), Some(3));
        assert!(p.apply((1..=8).collect::<Vec<i32>>()).is_empty());
    }

    #[test]
    fn test_pagination_huge_page() {
        let p = Pagination::new(Some(u32::MAX), Some(100));
        assert_eq!(p.offset(), (u32::MAX as usize - 1).saturating_mul(100));
        assert!(p.apply((1..=8).collect::<Vec<i32>>()).is_empty());

        let meta = PaginationMeta::new(&p, 8);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_meta() {
        let p = Pagination::new(Some(2), Some(10));
        let meta = PaginationMeta::new(&p, 25);

        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err: ApiError = StorageError::NotFound("team x".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_storage_failure_is_generic() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: ApiError = StorageError::Io(io).into();
        assert_eq!(err.to_string(), "Internal error: Failed to load team data");
    }
}
