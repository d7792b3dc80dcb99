//! Typed response-schema builder for schema-constrained engine calls.
//!
//! The schema travels separately from the prompt text so each can be unit
//! tested on its own. Serialized to the engine's OpenAPI-style shape
//! (uppercase `type`, `properties`, `required`, `items`).

use serde_json::{json, Map, Value};

/// Engine response schema. Only the shapes the pipelines need: string leaves,
/// objects with optional required-field lists, and arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Object {
        properties: Vec<(String, Schema)>,
        required: Vec<String>,
    },
    Array(Box<Schema>),
}

impl Schema {
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        Schema::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: Vec::new(),
        }
    }

    /// Marks fields as required. No-op on non-object schemas.
    pub fn required(mut self, fields: &[&str]) -> Self {
        if let Schema::Object { required, .. } = &mut self {
            *required = fields.iter().map(|f| f.to_string()).collect();
        }
        self
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    /// Serializes into the engine's `responseSchema` wire form.
    pub fn to_value(&self) -> Value {
        match self {
            Schema::String => json!({ "type": "STRING" }),
            Schema::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, schema) in properties {
                    props.insert(name.clone(), schema.to_value());
                }
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("OBJECT"));
                obj.insert("properties".to_string(), Value::Object(props));
                if !required.is_empty() {
                    obj.insert("required".to_string(), json!(required));
                }
                Value::Object(obj)
            }
            Schema::Array(items) => json!({
                "type": "ARRAY",
                "items": items.to_value(),
            }),
        }
    }
}
