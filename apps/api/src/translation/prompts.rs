// Engine prompt constants for the Translation module.

/// Translation instruction. Replace `{source_language}`, `{target_language}`
/// and `{payload_json}` before sending. The payload carries only the
/// language-bearing projection of the profile; dates, ids and the photo
/// never travel to the engine.
pub const TRANSLATION_PROMPT_TEMPLATE: &str = r#"Translate the text values in the following JSON object from {source_language} to {target_language}. Maintain the exact JSON structure in your response. Only translate the string values for "fullName", "position", "company", and "description".

JSON data:
{payload_json}"#;
