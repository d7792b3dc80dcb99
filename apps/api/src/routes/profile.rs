//! Profile editing handlers: the direct field-edit surface used by the form
//! UI. Single-field updates only; pipelines are the only other writers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{EntryField, Photo, ProfileField};
use crate::session::guard::OperationGuard;
use crate::session::ProfileSnapshot;
use crate::state::AppState;

/// GET /api/v1/profile
///
/// Fresh read-only snapshot for the rendering collaborator, which re-requests
/// it after every mutation.
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<ProfileSnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct ProfileFieldUpdate {
    pub field: ProfileField,
    pub value: String,
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileFieldUpdate>,
) -> Json<ProfileSnapshot> {
    let mut session = state.session.lock().await;
    session.profile.set(req.field, req.value);
    Json(session.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct EntryFieldUpdate {
    pub field: EntryField,
    pub value: String,
}

/// PATCH /api/v1/profile/entries/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EntryFieldUpdate>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    let mut session = state.session.lock().await;
    session
        .profile
        .entry_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("Entry {id} not found")))?
        .set(req.field, req.value);
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Serialize)]
pub struct AppendedEntry {
    pub id: Uuid,
}

/// POST /api/v1/profile/entries
pub async fn handle_append_entry(State(state): State<AppState>) -> Json<AppendedEntry> {
    let mut session = state.session.lock().await;
    let id = session.profile.append_entry();
    Json(AppendedEntry { id })
}

/// DELETE /api/v1/profile/entries/:id
///
/// Silent no-op when the id is unknown; remaining ids are never renumbered.
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let mut session = state.session.lock().await;
    session.profile.remove_entry(id);
    StatusCode::NO_CONTENT
}

/// PUT /api/v1/profile/photo
pub async fn handle_set_photo(
    State(state): State<AppState>,
    Json(photo): Json<Photo>,
) -> Result<StatusCode, AppError> {
    BASE64
        .decode(photo.data.as_bytes())
        .map_err(|e| AppError::Validation(format!("Photo data is not valid base64: {e}")))?;
    let mut session = state.session.lock().await;
    session.profile.photo = Some(photo);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/profile/photo
pub async fn handle_clear_photo(State(state): State<AppState>) -> StatusCode {
    let mut session = state.session.lock().await;
    session.profile.photo = None;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
pub struct OperationsView {
    pub extraction: OperationGuard,
    pub translation: OperationGuard,
    pub recommendation: OperationGuard,
}

/// GET /api/v1/operations
///
/// Observable guard state per pipeline; a `failed` state keeps its message
/// until that pipeline's next invocation.
pub async fn handle_get_operations(State(state): State<AppState>) -> Json<OperationsView> {
    let session = state.session.lock().await;
    Json(OperationsView {
        extraction: session.extraction.clone(),
        translation: session.translation.clone(),
        recommendation: session.recommendation_op.clone(),
    })
}
