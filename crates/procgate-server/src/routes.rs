//! HTTP routes

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use procgate_connection::HealthStatus;
use procgate_services::{HealthReport, ProcedureRequest, ProcedureResponse, ProcedureService};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProcedureService>,
}

impl AppState {
    pub fn new(service: ProcedureService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProcedureList {
    procedures: Vec<String>,
}

/// Build the router with tracing and a request body limit
///
/// The limit is enforced by the `Json` extractor, so an oversized body is
/// answered through `ApiError` with the usual error envelope.
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/procedures", get(list_procedures))
        .route("/api/procedures/invoke", post(invoke_procedure))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %uuid::Uuid::new_v4(),
            )
        }))
        .with_state(state)
}

/// `POST /api/procedures/invoke`
///
/// A procedure that reports `status = error` answers 422 with the normal
/// response body.
async fn invoke_procedure(
    State(state): State<AppState>,
    body: Result<Json<ProcedureRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProcedureResponse>), ApiError> {
    let Json(request) = body?;
    let response = state.service.invoke_json(request).await?;

    let status = if response.reported_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

async fn list_procedures(State(state): State<AppState>) -> Json<ProcedureList> {
    Json(ProcedureList {
        procedures: state.service.allowed_procedures(),
    })
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.service.health().await;
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}
