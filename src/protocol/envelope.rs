//! Response envelope builders.
//!
//! Pure construction of the standard success/error shapes. Writing the
//! envelope to the output stream is the caller's job; [`to_line`] only turns
//! it into the exact text of one output line.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{BridgeResponse, PERSONA_ERROR};

/// Line written once at startup, before any response.
pub const READY_SENTINEL: &str = "Genesis Ready";

/// Last-resort line used when not even an error envelope can be serialized.
pub const CRITICAL_ERROR_LINE: &str =
    r#"{"success": false, "persona": "error", "result": {"error": "Critical error"}}"#;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Build a successful response for `persona` carrying `result`.
pub fn success(persona: impl Into<String>, result: Map<String, Value>) -> BridgeResponse {
    BridgeResponse {
        success: true,
        persona: persona.into(),
        result,
        evolution_insights: None,
        ethical_decision: None,
        consciousness_state: None,
        fusion_ability: None,
    }
}

/// Build an error response: `persona = "error"`, `result = {error: message}`.
///
/// An empty message is replaced so `result.error` is never blank.
pub fn error(message: impl Into<String>) -> BridgeResponse {
    error_with_persona(PERSONA_ERROR, message)
}

/// Build an error response under a specific persona tag.
pub fn error_with_persona(
    persona: impl Into<String>,
    message: impl Into<String>,
) -> BridgeResponse {
    let mut message = message.into();
    if message.trim().is_empty() {
        message = UNKNOWN_ERROR.to_string();
    }
    let mut result = Map::new();
    result.insert("error".to_string(), Value::String(message));
    BridgeResponse {
        success: false,
        persona: persona.into(),
        result,
        evolution_insights: None,
        ethical_decision: None,
        consciousness_state: None,
        fusion_ability: None,
    }
}

/// Current time as an RFC 3339 timestamp.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a response into one output line (without the trailing newline).
///
/// Never fails: a response that cannot be serialized is replaced by an error
/// envelope, and that by [`CRITICAL_ERROR_LINE`].
pub fn to_line(response: &BridgeResponse) -> String {
    serialize_or_fallback(response)
}

/// Serialize any value into one output line with the same fallback chain as
/// [`to_line`].
pub fn serialize_or_fallback<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(line) => line,
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            let fallback = error(format!("Response serialization failed: {}", e));
            serde_json::to_string(&fallback).unwrap_or_else(|_| CRITICAL_ERROR_LINE.to_string())
        }
    }
}
