use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::recommendation::run_recommendation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    /// `None` until a recommendation has been generated successfully.
    pub text: Option<String>,
}

/// POST /api/v1/recommendation
pub async fn handle_recommendation(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<RecommendationView>, AppError> {
    let text = run_recommendation(&state, &req.notes).await?;
    Ok(Json(RecommendationView { text: Some(text) }))
}

/// GET /api/v1/recommendation
///
/// The export/share collaborator reads the current text here. May be stale
/// relative to later profile edits; only a successful regeneration replaces
/// it.
pub async fn handle_get_recommendation(State(state): State<AppState>) -> Json<RecommendationView> {
    let session = state.session.lock().await;
    Json(RecommendationView {
        text: session.recommendation.clone(),
    })
}
