//! Translation pipeline: flips the profile between the two supported
//! languages without touching identity or chronology.
//!
//! Only the language-bearing projection (`fullName` + per-entry `position`,
//! `company`, `description`) is sent to the engine. The translated result is
//! merged back by index, never by id or content, and the active-language
//! flag flips in the same critical section as the merge so a reader can
//! never observe translated content paired with the old flag.

pub mod handlers;
pub mod prompts;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::schema::Schema;
use crate::llm_client::{decode_json, EngineRequest};
use crate::models::profile::{Profile, ProfileEntry};
use crate::session::{Language, ProfileSnapshot};
use crate::state::AppState;
use prompts::TRANSLATION_PROMPT_TEMPLATE;

/// The language-bearing projection sent to the engine, in entry order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslationPayload {
    full_name: String,
    experience: Vec<PayloadEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadEntry {
    position: String,
    company: String,
    description: String,
}

impl TranslationPayload {
    fn project(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            experience: profile
                .entries
                .iter()
                .map(|e| PayloadEntry {
                    position: e.position.clone(),
                    company: e.company.clone(),
                    description: e.description.clone(),
                })
                .collect(),
        }
    }
}

/// Engine response, mirroring the payload shape. The schema marks everything
/// required; a response without `experience` fails decode and surfaces as a
/// translation failure, but per-item fields are still tolerated as absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    #[serde(default)]
    pub full_name: Option<String>,
    pub experience: Vec<TranslatedFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedFields {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Output schema mirroring the payload exactly, all fields required.
fn response_schema() -> Schema {
    Schema::object(vec![
        ("fullName", Schema::String),
        (
            "experience",
            Schema::array(
                Schema::object(vec![
                    ("position", Schema::String),
                    ("company", Schema::String),
                    ("description", Schema::String),
                ])
                .required(&["position", "company", "description"]),
            ),
        ),
    ])
    .required(&["fullName", "experience"])
}

fn build_request(
    payload: &TranslationPayload,
    source: Language,
    target: Language,
) -> Result<EngineRequest, AppError> {
    let payload_json = serde_json::to_string_pretty(payload)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize translation payload: {e}")))?;
    let prompt = TRANSLATION_PROMPT_TEMPLATE
        .replace("{source_language}", source.english_name())
        .replace("{target_language}", target.english_name())
        .replace("{payload_json}", &payload_json);

    Ok(EngineRequest {
        prompt,
        attachment: None,
        response_schema: Some(response_schema()),
    })
}

/// Index-zip merge. For index `i < translated.len()` each returned field
/// overwrites its original; everything else (trailing entries, absent
/// fields, ids, dates) is kept verbatim. Never adds, removes, or reorders
/// entries.
pub fn zip_merge(
    mut original: Vec<ProfileEntry>,
    translated: Vec<TranslatedFields>,
) -> Vec<ProfileEntry> {
    for (entry, fields) in original.iter_mut().zip(translated) {
        if let Some(position) = fields.position {
            entry.position = position;
        }
        if let Some(company) = fields.company {
            entry.company = company;
        }
        if let Some(description) = fields.description {
            entry.description = description;
        }
    }
    original
}

/// Runs the translation pipeline toward the other supported language and
/// returns the flipped snapshot.
pub async fn run_translation(state: &AppState) -> Result<ProfileSnapshot, AppError> {
    let (payload, source, target) = {
        let mut session = state.session.lock().await;
        session.translation.begin()?;
        let source = session.language;
        (
            TranslationPayload::project(&session.profile),
            source,
            source.other(),
        )
    };

    info!(
        "Translation started: {} -> {} ({} entries)",
        source.english_name(),
        target.english_name(),
        payload.experience.len()
    );

    // Detached task: once begun, the pipeline runs to completion even if the
    // caller disconnects and the handler future is dropped, so the guard
    // always resolves out of `Running`.
    let state = state.clone();
    let task = tokio::spawn(async move {
        let outcome = match build_request(&payload, source, target) {
            Ok(request) => match state.engine.generate(&request).await {
                Ok(text) => decode_json::<TranslationResponse>(&text).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(e.to_string()),
        };

        let mut session = state.session.lock().await;
        match outcome {
            Ok(response) => {
                if let Some(full_name) = response.full_name {
                    if !full_name.is_empty() {
                        session.profile.full_name = full_name;
                    }
                }
                let entries = std::mem::take(&mut session.profile.entries);
                session.profile.entries = zip_merge(entries, response.experience);
                // Same critical section as the merge: flag and content flip
                // together.
                session.language = target;
                session.translation.succeed();
                info!("Translation succeeded: active language is now {:?}", target);
                Ok(session.snapshot())
            }
            Err(message) => {
                session.translation.fail(message.clone());
                Err(AppError::Translation(message))
            }
        }
    });

    task.await
        .map_err(|e| AppError::Internal(anyhow!("Translation task failed: {e}")))?
}
