/// Generation engine client — the single point of entry for all Gemini calls
/// in Kadra.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All engine interactions MUST go through this module.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub mod schema;

use schema::Schema;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all engine calls in Kadra.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Engine returned empty content")]
    EmptyContent,
}

/// A binary document attached alongside the prompt. The engine reads the
/// bytes natively (image or PDF); no local parsing happens on our side.
#[derive(Debug, Clone)]
pub struct InlineData {
    pub mime_type: String,
    /// Standard base64 of the document bytes.
    pub data: String,
}

/// One engine call: a prompt, an optional attached document, and an optional
/// output schema. With a schema present the engine is constrained to return
/// a JSON document of exactly that shape.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub prompt: String,
    pub attachment: Option<InlineData>,
    pub response_schema: Option<Schema>,
}

impl EngineRequest {
    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            attachment: None,
            response_schema: None,
        }
    }
}

/// The engine seam. Pipelines depend on this trait, never on `GeminiClient`
/// directly, so tests can substitute a scripted mock.
///
/// Carried in `AppState` as `Arc<dyn GenerationEngine>`.
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Returns the raw response text. When `response_schema` was supplied the
    /// text is expected (by contract with the engine) to be conformant JSON.
    async fn generate(&self, request: &EngineRequest) -> Result<String, EngineError>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extracts the text of the first candidate's first text part.
    fn text(&self) -> Option<&str> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_deref()?
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single engine client used by all pipelines in Kadra.
/// Wraps the Gemini generateContent API with retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn request_body(request: &EngineRequest) -> serde_json::Value {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(attachment) = &request.attachment {
            parts.push(json!({
                "inlineData": {
                    "mimeType": attachment.mime_type,
                    "data": attachment.data,
                }
            }));
        }

        let mut body = json!({ "contents": [{ "parts": parts }] });
        if let Some(schema) = &request.response_schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema.to_value(),
            });
        }
        body
    }
}

#[async_trait]
impl GenerationEngine for GeminiClient {
    /// Makes a call to the Gemini API, returning the response text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn generate(&self, request: &EngineRequest) -> Result<String, EngineError> {
        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let request_body = Self::request_body(request);

        let mut last_error: Option<EngineError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Engine call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EngineError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Engine API returned {}: {}", status, body);
                last_error = Some(EngineError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EngineError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let engine_response: GenerateContentResponse = response.json().await?;

            let text = match engine_response.text() {
                Some(t) => t.to_string(),
                None => return Err(EngineError::EmptyContent),
            };

            debug!("Engine call succeeded: {} chars returned", text.len());

            return Ok(text);
        }

        Err(last_error.unwrap_or(EngineError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Decodes a schema-constrained response body. A decode failure is treated
/// exactly like a transport failure by the callers.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, EngineError> {
    serde_json::from_str(strip_json_fences(text)).map_err(EngineError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from engine output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Scripted engine double for pipeline tests.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Pops one scripted response per call; `Err(msg)` entries surface as
    /// API errors. Panics if called more times than it was scripted for.
    pub struct MockEngine {
        responses: Mutex<VecDeque<Result<String, String>>>,
        calls: AtomicUsize,
        delay: Option<std::time::Duration>,
        pub last_request: Mutex<Option<EngineRequest>>,
    }

    impl MockEngine {
        pub fn replying(text: &str) -> Self {
            Self::scripted(vec![Ok(text.to_string())])
        }

        pub fn failing(message: &str) -> Self {
            Self::scripted(vec![Err(message.to_string())])
        }

        /// Like `replying`, but the call sleeps first. Used to exercise
        /// callers that give up mid-flight.
        pub fn delayed(text: &str, delay: std::time::Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::replying(text)
            }
        }

        pub fn scripted(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
                delay: None,
                last_request: Mutex::new(None),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationEngine for MockEngine {
        async fn generate(&self, request: &EngineRequest) -> Result<String, EngineError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("MockEngine called more times than scripted");
            next.map_err(|message| EngineError::Api {
                status: 500,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_decode_json_reports_parse_error() {
        let result: Result<serde_json::Value, _> = decode_json("not json at all");
        assert!(matches!(result, Err(EngineError::Parse(_))));
    }

    #[test]
    fn test_request_body_with_attachment_and_schema() {
        let request = EngineRequest {
            prompt: "analyze this".to_string(),
            attachment: Some(InlineData {
                mime_type: "application/pdf".to_string(),
                data: "QUJD".to_string(),
            }),
            response_schema: Some(Schema::object(vec![("fullName", Schema::String)])),
        };

        let body = GeminiClient::request_body(&request);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "analyze this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["type"],
            "OBJECT"
        );
    }

    #[test]
    fn test_request_body_plain_text_has_no_generation_config() {
        let body = GeminiClient::request_body(&EngineRequest::text("hello".to_string()));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(body.get("generationConfig").is_none());
    }
}
