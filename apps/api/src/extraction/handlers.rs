use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::{run_extraction, AttachedDocument, ExtractionInput};
use crate::session::ProfileSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

/// File as received from the drag/drop collaborator: name, MIME type, and
/// base64 of the bytes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

/// POST /api/v1/extraction
pub async fn handle_extraction(
    State(state): State<AppState>,
    Json(req): Json<ExtractionRequest>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    let file = req
        .file
        .map(|f| {
            let bytes = BASE64
                .decode(f.data.as_bytes())
                .map_err(|e| AppError::Validation(format!("File data is not valid base64: {e}")))?;
            Ok::<_, AppError>(AttachedDocument {
                name: f.name,
                mime_type: f.mime_type,
                bytes,
            })
        })
        .transpose()?;

    let input = ExtractionInput::new(req.raw_text, file)?;
    let snapshot = run_extraction(&state, input).await?;
    Ok(Json(snapshot))
}
