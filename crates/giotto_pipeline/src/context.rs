//! Shared execution context threaded between pipeline steps.

use giotto_error::{GiottoResult, PipelineError, PipelineErrorKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::debug;

/// An open key-value mapping threaded through pipeline steps.
///
/// Values are JSON so workflows can accumulate heterogeneous fields
/// (generated content, created-resource identifiers, counters) without a
/// fixed schema. The context is immutable by convention: a step receives the
/// current context and returns the fields to merge, rather than mutating
/// shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StepContext {
    data: HashMap<String, JsonValue>,
}

impl StepContext {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Gets a raw value from the context.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    /// Gets a string value from the context.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(JsonValue::as_str)
    }

    /// Deserializes a context value into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or the value does not match the
    /// requested shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> GiottoResult<T> {
        let value = self.data.get(key).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::ContextValue(format!(
                "key '{}' not present in context",
                key
            )))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            PipelineError::new(PipelineErrorKind::ContextValue(format!(
                "key '{}' has unexpected shape: {}",
                key, e
            )))
            .into()
        })
    }

    /// Sets a value in the context.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        let key = key.into();
        let value = value.into();
        debug!(key = %key, "Setting context value");
        self.data.insert(key, value);
    }

    /// Serializes a typed value into the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn set_serialize<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> GiottoResult<()> {
        let serialized = serde_json::to_value(value).map_err(|e| {
            PipelineError::new(PipelineErrorKind::ContextValue(format!(
                "value could not be serialized: {}",
                e
            )))
        })?;
        self.set(key, serialized);
        Ok(())
    }

    /// Removes a value from the context.
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.data.remove(key)
    }

    /// Checks if a key exists in the context.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Gets all keys in the context.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    /// Number of fields in the context.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the context holds no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Merges `other` into this context, consuming both.
    ///
    /// Fields from `other` augment this context; on key collision, `other`
    /// wins.
    pub fn merged(mut self, other: StepContext) -> StepContext {
        self.data.extend(other.data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let mut context = StepContext::new();

        context.set("post_id", "123456");
        assert_eq!(context.get_str("post_id"), Some("123456"));
        assert!(context.contains_key("post_id"));
        assert!(!context.contains_key("missing"));

        assert_eq!(context.remove("post_id"), Some(json!("123456")));
        assert_eq!(context.get("post_id"), None);
        assert!(context.is_empty());
    }

    #[test]
    fn typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Draft {
            body: String,
            hashtags: Vec<String>,
        }

        let draft = Draft {
            body: "hello".to_string(),
            hashtags: vec!["#art".to_string()],
        };

        let mut context = StepContext::new();
        context.set_serialize("draft", &draft).unwrap();

        let recovered: Draft = context.get_as("draft").unwrap();
        assert_eq!(recovered, draft);
    }

    #[test]
    fn get_as_reports_missing_and_mismatched_keys() {
        let mut context = StepContext::new();
        context.set("count", 3);

        assert!(context.get_as::<String>("missing").is_err());
        assert!(context.get_as::<Vec<String>>("count").is_err());
        assert_eq!(context.get_as::<u32>("count").unwrap(), 3);
    }

    #[test]
    fn merged_overwrites_on_collision() {
        let mut first = StepContext::new();
        first.set("content", "draft");
        first.set("author", "bot");

        let mut second = StepContext::new();
        second.set("content", "final");
        second.set("post_id", 42);

        let merged = first.merged(second);
        assert_eq!(merged.get_str("content"), Some("final"));
        assert_eq!(merged.get_str("author"), Some("bot"));
        assert_eq!(merged.get("post_id"), Some(&json!(42)));
        assert_eq!(merged.len(), 3);
    }
}
