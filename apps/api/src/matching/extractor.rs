//! Preference Extractor — turns a raw search request into structured,
//! normalized preferences via the text-generation service.
//!
//! Loosely-typed model JSON is converted into the fixed
//! [`StructuredPreferences`] shape right here at the boundary: "missing key",
//! "null", and "unexpected type" all collapse into "field absent". Raw JSON
//! never travels past this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{strip_json_fences, LlmClient};
use crate::matching::normalizer::{normalize, FieldKind};
use crate::matching::prompts::{PREFERENCE_EXTRACT_SYSTEM, PREFERENCE_EXTRACT_TEMPLATE};

/// The text-generation service was unreachable or its reply was not a JSON
/// object at all. Callers treat this as "search without filters", never as a
/// fatal error.
#[derive(Debug, Error)]
#[error("preference extraction unavailable: {0}")]
pub struct ExtractionUnavailable(pub String);

/// Structured job preferences for one search. Every present field has
/// already been normalized; built fresh per query and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPreferences {
    pub role: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub salary: Option<String>,
}

impl StructuredPreferences {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.location.is_none()
            && self.experience.is_none()
            && self.salary.is_none()
    }
}

#[async_trait]
pub trait PreferenceExtractor: Send + Sync {
    async fn extract(&self, raw_query: &str) -> Result<StructuredPreferences, ExtractionUnavailable>;
}

/// Production extractor backed by the chat-completions client.
pub struct LlmPreferenceExtractor {
    llm: LlmClient,
}

impl LlmPreferenceExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PreferenceExtractor for LlmPreferenceExtractor {
    async fn extract(&self, raw_query: &str) -> Result<StructuredPreferences, ExtractionUnavailable> {
        let prompt = PREFERENCE_EXTRACT_TEMPLATE.replace("{query}", raw_query);

        let response = self
            .llm
            .call(&prompt, PREFERENCE_EXTRACT_SYSTEM)
            .await
            .map_err(|e| ExtractionUnavailable(e.to_string()))?;

        let text = response
            .text()
            .ok_or_else(|| ExtractionUnavailable("model returned no text content".to_string()))?;

        let value: Value = serde_json::from_str(strip_json_fences(text))
            .map_err(|e| ExtractionUnavailable(format!("model returned non-JSON content: {e}")))?;
        if !value.is_object() {
            return Err(ExtractionUnavailable(
                "model returned JSON that is not an object".to_string(),
            ));
        }

        let prefs = preferences_from_value(&value);
        debug!(?prefs, "extracted job preferences");
        Ok(prefs)
    }
}

/// Builds normalized preferences from a model reply. A partial or even empty
/// object is fine; only the keys that carry a usable string survive.
pub(crate) fn preferences_from_value(value: &Value) -> StructuredPreferences {
    StructuredPreferences {
        role: string_field(value, "role").map(|s| normalize(FieldKind::Role, &s)),
        location: string_field(value, "location").map(|s| normalize(FieldKind::Location, &s)),
        experience: string_field(value, "experience")
            .map(|s| normalize(FieldKind::Experience, &s)),
        salary: string_field(value, "salary").map(|s| normalize(FieldKind::Salary, &s)),
    }
}

/// A field is present only if the key holds a non-empty string. Models
/// sometimes spell absence as the literal "null" or "none"; those count as
/// absent too.
fn string_field(value: &Value, key: &str) -> Option<String> {
    let s = value.get(key)?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(s.to_string())
}
