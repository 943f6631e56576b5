use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Parsed response payload.
/// JSON when the server says so, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn from_text(text: String) -> Self {
        if text.is_empty() {
            ResponseBody::Empty
        } else {
            ResponseBody::Text(text)
        }
    }

    /// Body of a failed response as carried by `ClientError::Http`.
    /// Plain text bodies are wrapped as `{ "message": text }`.
    pub fn into_error_body(self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(text) => Some(serde_json::json!({ "message": text })),
            ResponseBody::Empty => None,
        }
    }

    /// JSON view of any body: text becomes a string, empty becomes null
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
            ResponseBody::Empty => Value::Null,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty | ResponseBody::Json(Value::Null))
    }

    /// Decode a JSON body into `T`
    pub fn decode<T: DeserializeOwned>(self) -> ClientResult<T> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
            }
            ResponseBody::Text(text) => Err(ClientError::Decode(format!(
                "expected JSON, got text: {}",
                truncate(&text, 80)
            ))),
            ResponseBody::Empty => Err(ClientError::Decode("expected JSON, got empty body".to_string())),
        }
    }

    /// Decode a list, treating an empty or null body as no items
    pub fn decode_list<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        self.decode()
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
