use std::sync::Arc;

use tokio::sync::Mutex;

use crate::llm_client::GenerationEngine;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum
/// extractors.
///
/// Pipelines lock the session only around guard transitions and merges;
/// the lock is never held across an engine call.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable generation engine. Production: `GeminiClient`; tests script
    /// responses through a mock.
    pub engine: Arc<dyn GenerationEngine>,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(engine: Arc<dyn GenerationEngine>) -> Self {
        Self {
            engine,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }
}
