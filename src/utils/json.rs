//! JSON extraction from free-text LLM responses.
//!
//! Judge and moderator responses are requested as JSON but routinely arrive
//! wrapped in prose or markdown fences. The policy here is deliberately
//! simple: take the substring from the first `{` to the last `}` and attempt
//! a strict parse of that. Callers own the fallback value when extraction or
//! parsing fails; nothing in this module invents defaults.

use serde::de::DeserializeOwned;

/// Extract the substring spanning the first `{` to the last `}`.
///
/// Returns `None` when no such span exists. The span is not validated here;
/// the caller's parse decides whether it is usable.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}

/// Extract and strictly parse a JSON object embedded in free text.
///
/// Returns `None` when no object span exists or the span does not parse as
/// `T`. A parse failure is logged at debug level so fallback behavior stays
/// diagnosable without surfacing an error.
pub fn parse_json_object<T: DeserializeOwned>(content: &str) -> Option<T> {
    let span = extract_json_object(content)?;
    match serde_json::from_str(span) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "Embedded JSON object failed strict parse");
            None
        }
    }
}
