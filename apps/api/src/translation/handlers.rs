use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::session::ProfileSnapshot;
use crate::state::AppState;
use crate::translation::run_translation;

/// POST /api/v1/translation
///
/// Takes no body: the session's active-language flag decides the source, and
/// the target is always the other supported tag.
pub async fn handle_translation(
    State(state): State<AppState>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    let snapshot = run_translation(&state).await?;
    Ok(Json(snapshot))
}
