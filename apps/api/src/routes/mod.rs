pub mod health;
pub mod profile;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::extraction::handlers as extraction_handlers;
use crate::recommendation::handlers as recommendation_handlers;
use crate::state::AppState;
use crate::translation::handlers as translation_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile model
        .route("/api/v1/profile", get(profile::handle_get_profile))
        .route("/api/v1/profile", patch(profile::handle_update_profile))
        .route("/api/v1/profile/photo", put(profile::handle_set_photo))
        .route("/api/v1/profile/photo", delete(profile::handle_clear_photo))
        .route("/api/v1/profile/entries", post(profile::handle_append_entry))
        .route(
            "/api/v1/profile/entries/:id",
            patch(profile::handle_update_entry),
        )
        .route(
            "/api/v1/profile/entries/:id",
            delete(profile::handle_remove_entry),
        )
        // Pipelines
        .route(
            "/api/v1/extraction",
            post(extraction_handlers::handle_extraction),
        )
        .route(
            "/api/v1/translation",
            post(translation_handlers::handle_translation),
        )
        .route(
            "/api/v1/recommendation",
            post(recommendation_handlers::handle_recommendation),
        )
        .route(
            "/api/v1/recommendation",
            get(recommendation_handlers::handle_get_recommendation),
        )
        // Pipeline guard state
        .route("/api/v1/operations", get(profile::handle_get_operations))
        .with_state(state)
}
