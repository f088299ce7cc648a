// Immutable wrapper around one decoded API response.

use crate::error::{ApiError, Result};
use serde_json::Value;
use std::fmt;

/// Decoded JSON returned by every client operation.
///
/// The wrapper only adds accessors; it is never mutated after creation, so
/// values from different calls are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    value: Value,
}

impl ApiResponse {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Parse JSON text previously produced by [`ApiResponse::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })
    }

    pub fn json(&self) -> &Value {
        &self.value
    }

    pub fn into_json(self) -> Value {
        self.value
    }

    /// The provider's `result` member, when present.
    pub fn result(&self) -> Option<&Value> {
        self.value.get("result")
    }

    /// JSON pointer lookup, e.g. `"/result/url"`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.value).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.value).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}

impl From<Value> for ApiResponse {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ApiResponse {
        ApiResponse::new(json!({
            "status": 200,
            "msg": "OK",
            "result": {
                "folders": [{"id": "f1", "name": "Movies"}],
                "files": [{"name": "clip.mp4", "size": 1024, "convert": "converted", "link": null}]
            }
        }))
    }

    #[test]
    fn json_text_round_trips() {
        let original = sample();
        let text = original.to_json().unwrap();
        let restored = ApiResponse::from_json(&text).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.json(), original.json());
    }

    #[test]
    fn pretty_text_round_trips() {
        let original = sample();
        let restored = ApiResponse::from_json(&original.to_json_pretty().unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn accessors_reach_nested_fields() {
        let response = sample();
        assert_eq!(response.result().unwrap()["folders"][0]["name"], "Movies");
        assert_eq!(response.pointer("/result/files/0/size"), Some(&json!(1024)));
        assert_eq!(response.pointer("/result/url"), None);
    }

    #[test]
    fn invalid_text_is_decode_error() {
        assert!(matches!(
            ApiResponse::from_json("{broken").unwrap_err(),
            ApiError::Decode { .. }
        ));
    }
}
