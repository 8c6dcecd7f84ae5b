use crate::infra::AppState;
use admissions_portal::catalog::Course;
use admissions_portal::error::AppError;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseFilter {
    #[serde(default)]
    pub(crate) q: Option<String>,
    #[serde(default)]
    pub(crate) level: Option<String>,
}

pub(crate) fn portal_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/courses", get(list_courses))
        .route("/api/v1/courses/:course_id", get(course_detail))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_courses(
    Extension(state): Extension<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Json<Vec<Course>> {
    let courses = state
        .catalog
        .filter(filter.q.as_deref(), filter.level.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Json(courses)
}

pub(crate) async fn course_detail(
    Extension(state): Extension<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = state.catalog.get(&course_id)?;
    Ok(Json(course.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admissions_portal::catalog::CourseCatalog;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            catalog: Arc::new(CourseCatalog::standard()),
        };
        portal_routes().layer(Extension(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, body) = get_json(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, _) = get_json(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn courses_are_listed_in_catalog_order() {
        let (status, body) = get_json(app(true), "/api/v1/courses").await;
        assert_eq!(status, StatusCode::OK);
        let courses = body.as_array().expect("array");
        assert_eq!(courses.len(), 6);
        assert_eq!(courses[0]["id"], "computer-science");
        assert!(courses[0]["shortDescription"].is_string());
    }

    #[tokio::test]
    async fn courses_can_be_searched_and_filtered_by_level() {
        let (status, body) = get_json(app(true), "/api/v1/courses?q=design").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|course| course["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["graphic-design"]);

        let (_, body) =
            get_json(app(true), "/api/v1/courses?level=Master%27s%20Degree").await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (_, body) = get_json(app(true), "/api/v1/courses?q=zzz&level=Diploma").await;
        assert_eq!(body.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn course_detail_returns_one_course() {
        let (status, body) = get_json(app(true), "/api/v1/courses/data-science").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Data Science & Analytics");
    }

    #[tokio::test]
    async fn unknown_course_is_a_json_404() {
        let (status, body) = get_json(app(true), "/api/v1/courses/astrology").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("astrology")));
    }
}
