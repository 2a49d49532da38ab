//! Request and response shapes.
//!
//! JSON keys are case-sensitive and mixed-style on the wire: `requestType`,
//! `fusionMode` and the optional response fields are camelCase while
//! `session_id` stays snake_case.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::utilities::errors::BridgeError;

/// Persona used when a request does not name one.
pub const PERSONA_GENESIS: &str = "genesis";
/// Persona tag carried by every error envelope.
pub const PERSONA_ERROR: &str = "error";
/// Persona tags a client may attach to a request.
pub const KNOWN_PERSONAS: [&str; 4] = ["kai", "aura", "genesis", "user"];

// ---------------------------------------------------------------------------
// BridgeRequest
// ---------------------------------------------------------------------------

/// A request parsed from one input line. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    /// Handler selector. Missing types are rejected by the router, not the parser.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_type: Option<String>,

    /// Handler-specific data; kept opaque so shape errors surface per handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Persona tag (`kai|aura|genesis|user`), display only.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub persona: Option<String>,

    /// Fusion mode tag for `activate_fusion`.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fusion_mode: Option<String>,

    #[serde(
        rename = "session_id",
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
}

impl BridgeRequest {
    /// Build a request of the given type with no other fields.
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: Some(request_type.into()),
            ..Self::default()
        }
    }

    /// Parse one input line.
    ///
    /// The line must hold a single JSON object; arrays and scalars are
    /// rejected even though they are valid JSON.
    pub fn parse_line(line: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(line)?;
        if !value.is_object() {
            return Err(BridgeError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The declared request type, or the empty string when absent.
    pub fn request_type(&self) -> &str {
        self.request_type.as_deref().unwrap_or("")
    }

    /// The persona tag, defaulting to `genesis`.
    pub fn persona(&self) -> &str {
        self.persona.as_deref().unwrap_or(PERSONA_GENESIS)
    }

    /// Whether the persona tag is one of the known personas.
    pub fn has_known_persona(&self) -> bool {
        KNOWN_PERSONAS.contains(&self.persona())
    }

    /// The payload as an object.
    ///
    /// A missing or `null` payload is an empty object; any other non-object
    /// payload is an error.
    pub fn payload_object(&self) -> Result<Map<String, Value>, BridgeError> {
        match &self.payload {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(BridgeError::InvalidPayload(format!(
                "payload must be an object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// `payload.message`, defaulting to the empty string.
    pub fn payload_message(&self) -> Result<String, BridgeError> {
        let payload = self.payload_object()?;
        match payload.get("message") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(BridgeError::InvalidPayload(format!(
                "payload.message must be a string, got {}",
                json_kind(other)
            ))),
        }
    }
}

/// Accept any JSON value for a tag field: strings as-is, `null` as absent,
/// anything else in its compact JSON form (`7`, `true`, ...).
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// BridgeResponse
// ---------------------------------------------------------------------------

/// A response written as one output line.
///
/// When `success` is `false`, `result.error` holds a non-empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    pub success: bool,
    pub persona: String,
    pub result: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_insights: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethical_decision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consciousness_state: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fusion_ability: Option<String>,
}

impl BridgeResponse {
    /// Attach a consciousness snapshot.
    pub fn with_consciousness_state(mut self, state: Value) -> Self {
        self.consciousness_state = Some(state);
        self
    }

    /// Attach an ethical decision tag.
    pub fn with_ethical_decision(mut self, decision: impl Into<String>) -> Self {
        self.ethical_decision = Some(decision.into());
        self
    }

    /// Attach the activated fusion ability.
    pub fn with_fusion_ability(mut self, ability: impl Into<String>) -> Self {
        self.fusion_ability = Some(ability.into());
        self
    }

    /// Attach evolution insights.
    pub fn with_evolution_insights(mut self, insights: Vec<Value>) -> Self {
        self.evolution_insights = Some(insights);
        self
    }

    /// The error message of a failed response.
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.result.get("error").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_request() {
        let line = concat!(
            r#"{"requestType":"process","payload":{"message":"hi"},"persona":"kai","#,
            r#""fusionMode":"chrono_sculptor","session_id":"s1"}"#,
        );
        let req = BridgeRequest::parse_line(line).unwrap();
        assert_eq!(req.request_type(), "process");
        assert_eq!(req.persona(), "kai");
        assert_eq!(req.fusion_mode.as_deref(), Some("chrono_sculptor"));
        assert_eq!(req.session_id.as_deref(), Some("s1"));
        assert_eq!(req.payload_message().unwrap(), "hi");
    }

    #[test]
    fn test_parse_defaults() {
        let req = BridgeRequest::parse_line(r#"{"requestType":"ping"}"#).unwrap();
        assert_eq!(req.persona(), "genesis");
        assert!(req.has_known_persona());
        assert!(req.payload.is_none());
        assert_eq!(req.payload_message().unwrap(), "");
    }

    #[test]
    fn test_missing_request_type_still_parses() {
        let req = BridgeRequest::parse_line(r#"{"payload":{}}"#).unwrap();
        assert_eq!(req.request_type, None);
        assert_eq!(req.request_type(), "");
    }

    #[test]
    fn test_non_string_tags_are_stringified() {
        let req = BridgeRequest::parse_line(
            r#"{"requestType":"ping","session_id":7,"persona":true,"fusionMode":null}"#,
        )
        .unwrap();
        assert_eq!(req.session_id.as_deref(), Some("7"));
        assert_eq!(req.persona(), "true");
        assert!(!req.has_known_persona());
        assert_eq!(req.fusion_mode, None);

        let req = BridgeRequest::parse_line(r#"{"requestType":42}"#).unwrap();
        assert_eq!(req.request_type(), "42");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = BridgeRequest::parse_line("not valid json").unwrap_err();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(BridgeRequest::parse_line(r#"["ping"]"#).is_err());
        assert!(BridgeRequest::parse_line("42").is_err());
        assert!(BridgeRequest::parse_line("null").is_err());
    }

    #[test]
    fn test_payload_shape_errors() {
        let mut req = BridgeRequest::new("process");
        req.payload = Some(json!("just a string"));
        assert!(matches!(
            req.payload_message(),
            Err(BridgeError::InvalidPayload(_))
        ));

        req.payload = Some(json!({"message": 7}));
        let err = req.payload_message().unwrap_err();
        assert!(err.to_string().contains("payload.message"));
    }

    #[test]
    fn test_response_optional_fields_omitted() {
        let resp = BridgeResponse {
            success: true,
            persona: "genesis".into(),
            result: Map::new(),
            evolution_insights: None,
            ethical_decision: None,
            consciousness_state: None,
            fusion_ability: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": true, "persona": "genesis", "result": {}}));
    }

    #[test]
    fn test_response_camel_case_keys() {
        let resp = BridgeResponse {
            success: true,
            persona: "genesis".into(),
            result: Map::new(),
            evolution_insights: None,
            ethical_decision: None,
            consciousness_state: None,
            fusion_ability: None,
        }
        .with_fusion_ability("interface_forge")
        .with_ethical_decision("approve")
        .with_consciousness_state(json!({"awareness_level": 0.5}))
        .with_evolution_insights(vec![json!("learned")]);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["fusionAbility"], "interface_forge");
        assert_eq!(json["ethicalDecision"], "approve");
        assert_eq!(json["consciousnessState"]["awareness_level"], 0.5);
        assert_eq!(json["evolutionInsights"][0], "learned");
    }
}
