//! Recommendation synthesizer: profile plus recruiter notes in, opaque
//! prose out.
//!
//! No merge step and no output schema: the result is stored verbatim on
//! success and left stale on failure (a failed regeneration never clears the
//! previous text).

pub mod handlers;
pub mod prompts;

use anyhow::anyhow;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::EngineRequest;
use crate::models::profile::Profile;
use crate::state::AppState;
use prompts::RECOMMENDATION_PROMPT_TEMPLATE;

/// Human-readable CV block embedded in the prompt: name, birth date, and
/// every entry's position/company/date-range/description in display order.
pub fn profile_block(profile: &Profile) -> String {
    let mut block = format!(
        "Full Name: {}\nBirth Date: {}\nExperience:\n",
        profile.full_name, profile.birth_date
    );
    for entry in &profile.entries {
        block.push_str(&format!(
            "- {} at {} ({} to {}): {}\n",
            entry.position, entry.company, entry.start_date, entry.end_date, entry.description
        ));
    }
    block
}

/// Runs the recommendation pipeline and returns the generated prose.
pub async fn run_recommendation(state: &AppState, notes: &str) -> Result<String, AppError> {
    if notes.trim().is_empty() {
        return Err(AppError::Validation(
            "Recruiter notes must not be empty".to_string(),
        ));
    }

    let profile = {
        let mut session = state.session.lock().await;
        if session.profile.full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Profile full name must not be empty".to_string(),
            ));
        }
        session.recommendation_op.begin()?;
        session.profile.clone()
    };

    info!(
        "Recommendation started for '{}' ({} entries)",
        profile.full_name,
        profile.entries.len()
    );

    let prompt = RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{cv_details}", &profile_block(&profile))
        .replace("{recruiter_note}", notes);

    // Detached task: once begun, the pipeline runs to completion even if the
    // caller disconnects and the handler future is dropped, so the guard
    // always resolves out of `Running`.
    let state = state.clone();
    let task = tokio::spawn(async move {
        let outcome = state.engine.generate(&EngineRequest::text(prompt)).await;

        let mut session = state.session.lock().await;
        match outcome {
            Ok(text) => {
                session.recommendation = Some(text.clone());
                session.recommendation_op.succeed();
                info!("Recommendation succeeded ({} chars)", text.len());
                Ok(text)
            }
            Err(e) => {
                let message = e.to_string();
                session.recommendation_op.fail(message.clone());
                Err(AppError::Recommendation(message))
            }
        }
    });

    task.await
        .map_err(|e| AppError::Internal(anyhow!("Recommendation task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::MockEngine;

    #[test]
    fn test_profile_block_lists_every_entry_in_order() {
        let mut profile = Profile::sample();
        let id = profile.append_entry();
        profile
            .entry_mut(id)
            .unwrap()
            .set(crate::models::profile::EntryField::Position, "Kierowca".to_string());

        let block = profile_block(&profile);
        assert!(block.starts_with("Full Name: Jan Kowalski\nBirth Date: 16/10/1985\n"));
        let first = block.find("Pracownik magazynu").unwrap();
        let second = block.find("Kierowca").unwrap();
        assert!(first < second);
        assert!(block.contains("(2020-01 to 2022-12)"));
    }

    #[tokio::test]
    async fn test_empty_notes_rejected_without_engine_call() {
        let engine = Arc::new(MockEngine::scripted(vec![]));
        let state = AppState::new(engine.clone());

        let err = run_recommendation(&state, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(engine.call_count(), 0);
        // Rejected before the guard: no Failed state recorded either.
        assert!(state
            .session
            .lock()
            .await
            .recommendation_op
            .last_error()
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_full_name_rejected_without_engine_call() {
        let engine = Arc::new(MockEngine::scripted(vec![]));
        let state = AppState::new(engine.clone());
        state.session.lock().await.profile.full_name.clear();

        let err = run_recommendation(&state, "solid candidate").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_stores_text_verbatim() {
        let engine = Arc::new(MockEngine::replying("A great fit for warehouse work."));
        let state = AppState::new(engine.clone());

        let text = run_recommendation(&state, "speaks English, has a license")
            .await
            .unwrap();
        assert_eq!(text, "A great fit for warehouse work.");

        let session = state.session.lock().await;
        assert_eq!(
            session.recommendation.as_deref(),
            Some("A great fit for warehouse work.")
        );
        assert!(!session.recommendation_op.is_running());

        let request = engine.last_request.lock().unwrap().clone().unwrap();
        assert!(request.response_schema.is_none());
        assert!(request.prompt.contains("Jan Kowalski"));
        assert!(request.prompt.contains("speaks English, has a license"));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_recommendation() {
        let engine = Arc::new(MockEngine::scripted(vec![
            Ok("First recommendation.".to_string()),
            Err("engine unreachable".to_string()),
        ]));
        let state = AppState::new(engine);

        run_recommendation(&state, "notes").await.unwrap();
        let err = run_recommendation(&state, "notes again").await.unwrap_err();
        assert!(matches!(err, AppError::Recommendation(_)));

        let session = state.session.lock().await;
        // Stale-until-overwritten: the old text survives the failed run.
        assert_eq!(
            session.recommendation.as_deref(),
            Some("First recommendation.")
        );
        assert!(session.recommendation_op.last_error().is_some());
    }

    #[tokio::test]
    async fn test_dropped_caller_still_resolves_guard() {
        let engine = Arc::new(MockEngine::delayed(
            "A great fit for warehouse work.",
            std::time::Duration::from_millis(100),
        ));
        let state = AppState::new(engine);

        // The caller gives up mid-flight and drops the pipeline future.
        let caller = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            run_recommendation(&state, "notes"),
        );
        assert!(caller.await.is_err());

        // The detached task finishes anyway: the guard leaves `Running` and
        // the text is still stored.
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        let session = state.session.lock().await;
        assert!(!session.recommendation_op.is_running());
        assert_eq!(
            session.recommendation.as_deref(),
            Some("A great fit for warehouse work.")
        );
    }

    #[tokio::test]
    async fn test_rejected_while_running_without_engine_call() {
        let engine = Arc::new(MockEngine::scripted(vec![]));
        let state = AppState::new(engine.clone());
        state.session.lock().await.recommendation_op.begin().unwrap();

        let err = run_recommendation(&state, "notes").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(engine.call_count(), 0);
    }
}
