//! HTTP transport
//!
//! Routes:
//! - `PUT /dataset/:id/:kind` register a dataset from a JSON array of records
//! - `DELETE /dataset/:id` remove a dataset
//! - `GET /datasets` list stored datasets
//! - `POST /query` run a sentence sent as the plain-text body
//! - `GET /health` liveness

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use insight_ir::{Record, Row};
use insight_registry::DatasetKind;

use crate::facade::{FacadeError, InsightFacade};

#[derive(Clone)]
struct AppState {
    facade: Arc<InsightFacade>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

impl From<FacadeError> for ApiError {
    fn from(e: FacadeError) -> Self {
        let status = match e {
            FacadeError::NotFound(_) => StatusCode::NOT_FOUND,
            FacadeError::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        error_response(status, e)
    }
}

pub fn router(facade: Arc<InsightFacade>) -> Router {
    Router::new()
        .route("/dataset/:id/:kind", put(put_dataset))
        .route("/dataset/:id", delete(delete_dataset))
        .route("/datasets", get(list_datasets))
        .route("/query", post(perform_query))
        .route("/health", get(health_check))
        .with_state(AppState { facade })
}

pub async fn serve(addr: &str, facade: Arc<InsightFacade>) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("insight server listening on {}", addr);
    axum::serve(listener, router(facade)).await
}

async fn put_dataset(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    payload: Result<Json<Vec<Record>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(records) = payload.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
    let kind: DatasetKind = kind
        .parse()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;
    state.facade.add_dataset(&id, kind, records).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.facade.remove_dataset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_datasets(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "result": state.facade.list_datasets().await }))
}

#[derive(Serialize)]
struct QueryResponse {
    result: Vec<Row>,
}

async fn perform_query(
    State(state): State<AppState>,
    sentence: String,
) -> Result<Json<QueryResponse>, ApiError> {
    let result = state.facade.perform_query(&sentence).await?;
    Ok(Json(QueryResponse { result }))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use insight_ir::QueryError;
    use tower::ServiceExt;

    use crate::config::LimitsConfig;

    const COURSES: &str = r#"[
        {"dept": "cpsc", "id": "110", "avg": 95.5, "instructor": "kiczales", "title": "intro",
         "uuid": "1", "pass": 90, "fail": 5, "audit": 0, "year": 2015}
    ]"#;

    fn app() -> Router {
        router(Arc::new(InsightFacade::new(LimitsConfig::default())))
    }

    fn put(uri: &str, body: &str, json: bool) -> Request<Body> {
        let builder = Request::builder().method("PUT").uri(uri);
        let builder = if json {
            builder.header(header::CONTENT_TYPE, "application/json")
        } else {
            builder
        };
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn query(sentence: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/query")
            .body(Body::from(sentence.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_put_dataset_statuses() {
        let app = app();

        let response = app.clone().oneshot(put("/dataset/ubc/courses", COURSES, true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(put("/dataset/bad/courses", r#"[{"avg": true}]"#, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app.clone().oneshot(put("/dataset/plain/courses", COURSES, false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.clone().oneshot(put("/dataset/b/buildings", COURSES, true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(put("/dataset/ubc/courses", COURSES, true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_dataset() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/dataset/nowhere")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_route() {
        let app = app();
        app.clone().oneshot(put("/dataset/ubc/courses", COURSES, true)).await.unwrap();

        let response = app
            .clone()
            .oneshot(query("In courses dataset ubc, find entries whose Average is greater than 90; show Department."))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "result": [{ "ubc_dept": "cpsc" }] })
        );

        let response = app.oneshot(query("In courses dataset ubc, show Department.")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_status() {
        let (status, body) = ApiError::from(FacadeError::NotFound("c".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.error, "Dataset not found: c");

        let (status, _) = ApiError::from(FacadeError::Query(QueryError::NotFound("c".to_string())));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
