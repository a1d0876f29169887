//! HTTP route handlers for the diagnosis API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::diagnosis::{DiagnosisRequest, DiagnosisResponse};

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/diagnose", post(diagnose))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "medi-assist",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.service.model_id(),
        "cache_entries": state.service.cache_stats().map(|s| s.entries),
    }))
}

/// Diagnose request body. Both keys are required; `history` may be empty.
#[derive(Debug, Deserialize)]
pub struct DiagnoseBody {
    /// The patient's symptom.
    pub symptom: Option<String>,
    /// The patient's history.
    pub history: Option<String>,
}

impl DiagnoseBody {
    fn into_request(self) -> Result<DiagnosisRequest, ApiError> {
        match (self.symptom, self.history) {
            (Some(symptom), Some(history)) => Ok(DiagnosisRequest { symptom, history }),
            (symptom, history) => {
                let missing: Vec<&str> = [("'symptom'", symptom.is_none()), ("'history'", history.is_none())]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                Err(ApiError::MissingFields(missing.join(" and ")))
            }
        }
    }
}

/// Handle diagnose requests.
async fn diagnose(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DiagnoseBody>, JsonRejection>,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let request = body.into_request()?;

    // The provider client blocks; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || state.service.diagnose(&request))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;

    Ok(Json(response))
}
