//! Extraction pipeline: raw CV text or an attached document in, merged
//! profile out.
//!
//! Flow: validate input → guard begin → prompt + strict schema → engine call
//! → decode → merge-with-fallback into the session profile.
//!
//! The merge never blanks a field the engine failed to populate; a present
//! `experience` array replaces the entry sequence wholesale with freshly
//! minted ids. On any failure the profile is left entirely unmodified.

pub mod handlers;
pub mod prompts;

use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::schema::Schema;
use crate::llm_client::{decode_json, EngineRequest, InlineData};
use crate::models::profile::{Profile, ProfileEntry};
use crate::session::ProfileSnapshot;
use crate::state::AppState;
use prompts::EXTRACTION_PROMPT;

/// A binary CV document received from the file-ingestion boundary.
/// The engine reads the bytes natively; nothing is parsed locally.
#[derive(Debug, Clone)]
pub struct AttachedDocument {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Validated pipeline input: exactly one of `raw_text` (non-blank) or `file`.
#[derive(Debug, Clone)]
pub struct ExtractionInput {
    raw_text: Option<String>,
    file: Option<AttachedDocument>,
}

impl ExtractionInput {
    pub fn from_text(raw_text: String) -> Result<Self, AppError> {
        Self::new(Some(raw_text), None)
    }

    pub fn from_file(file: AttachedDocument) -> Result<Self, AppError> {
        Self::new(None, Some(file))
    }

    pub fn new(
        raw_text: Option<String>,
        file: Option<AttachedDocument>,
    ) -> Result<Self, AppError> {
        let raw_text = raw_text.filter(|t| !t.trim().is_empty());
        match (&raw_text, &file) {
            (None, None) => Err(AppError::Validation(
                "Provide CV text or a CV file to extract from".to_string(),
            )),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Provide either CV text or a CV file, not both".to_string(),
            )),
            _ => Ok(Self { raw_text, file }),
        }
    }
}

/// What the engine is allowed to return. Mirrored by `response_schema`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub experience: Option<Vec<ExtractedEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntry {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

/// Strict output schema attached to the engine request: the engine may
/// return exactly these fields and nothing else.
fn response_schema() -> Schema {
    Schema::object(vec![
        ("fullName", Schema::String),
        ("birthDate", Schema::String),
        (
            "experience",
            Schema::array(Schema::object(vec![
                ("position", Schema::String),
                ("company", Schema::String),
                ("startDate", Schema::String),
                ("endDate", Schema::String),
                ("description", Schema::String),
            ])),
        ),
    ])
}

fn build_request(input: &ExtractionInput) -> EngineRequest {
    let (prompt, attachment) = match (&input.raw_text, &input.file) {
        (Some(text), _) => (format!("{EXTRACTION_PROMPT}\n\nCV:\n{text}"), None),
        (_, Some(file)) => (
            EXTRACTION_PROMPT.to_string(),
            Some(InlineData {
                mime_type: file.mime_type.clone(),
                data: BASE64.encode(&file.bytes),
            }),
        ),
        // Unreachable: ExtractionInput construction enforces exactly one.
        (None, None) => (EXTRACTION_PROMPT.to_string(), None),
    };

    EngineRequest {
        prompt,
        attachment,
        response_schema: Some(response_schema()),
    }
}

/// Merge-with-fallback. `fullName`/`birthDate` overwrite only when the engine
/// returned a non-empty value; a present `experience` array (even an empty
/// one) becomes the canonical entry sequence, every entry under a fresh id.
pub fn merge_extraction(profile: &mut Profile, response: ExtractionResponse) {
    if let Some(full_name) = response.full_name {
        if !full_name.is_empty() {
            profile.full_name = full_name;
        }
    }
    if let Some(birth_date) = response.birth_date {
        if !birth_date.is_empty() {
            profile.birth_date = birth_date;
        }
    }
    if let Some(experience) = response.experience {
        profile.entries = experience
            .into_iter()
            .map(|e| ProfileEntry {
                id: Uuid::new_v4(),
                position: e.position,
                company: e.company,
                start_date: e.start_date,
                end_date: e.end_date,
                description: e.description,
            })
            .collect();
    }
}

/// Runs the extraction pipeline and returns the merged profile snapshot.
pub async fn run_extraction(
    state: &AppState,
    input: ExtractionInput,
) -> Result<ProfileSnapshot, AppError> {
    {
        let mut session = state.session.lock().await;
        session.extraction.begin()?;
    }

    if let Some(file) = &input.file {
        info!(
            "Extraction started from file '{}' ({}, {} bytes)",
            file.name,
            file.mime_type,
            file.bytes.len()
        );
    } else {
        info!("Extraction started from pasted text");
    }

    // Detached task: once begun, the pipeline runs to completion even if the
    // caller disconnects and the handler future is dropped, so the guard
    // always resolves out of `Running`.
    let state = state.clone();
    let task = tokio::spawn(async move {
        let request = build_request(&input);
        let outcome = match state.engine.generate(&request).await {
            Ok(text) => decode_json::<ExtractionResponse>(&text),
            Err(e) => Err(e),
        };

        let mut session = state.session.lock().await;
        match outcome {
            Ok(response) => {
                merge_extraction(&mut session.profile, response);
                session.extraction.succeed();
                info!(
                    "Extraction succeeded: profile now has {} entries",
                    session.profile.entries.len()
                );
                Ok(session.snapshot())
            }
            Err(e) => {
                let message = e.to_string();
                session.extraction.fail(message.clone());
                Err(AppError::Extraction(message))
            }
        }
    });

    task.await
        .map_err(|e| AppError::Internal(anyhow!("Extraction task failed: {e}")))?
}
