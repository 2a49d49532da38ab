//! The five standard request handlers.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::bridge::fusion::FusionMode;
use crate::bridge::router::{HandlerResult, RequestHandler, RequestKind};
use crate::collaborators::{ConsciousnessTracker, EthicalGovernor};
use crate::connector::{GenerationContext, GenesisConnector};
use crate::protocol::envelope::{self, timestamp};
use crate::protocol::types::{BridgeRequest, PERSONA_GENESIS};

/// SDK tag reported by `ping`.
pub const SDK: &str = "google-genai";

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

/// Static liveness report. Touches no shared state.
#[derive(Debug, Clone)]
pub struct PingHandler {
    model: String,
}

impl PingHandler {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl RequestHandler for PingHandler {
    fn handle(&self, _request: &BridgeRequest) -> HandlerResult {
        Ok(envelope::success(
            PERSONA_GENESIS,
            object(json!({
                "status": "online",
                "message": "Genesis Trinity system operational",
                "model": self.model,
                "sdk": SDK,
                "timestamp": timestamp(),
            })),
        ))
    }

    fn kind(&self) -> RequestKind {
        RequestKind::Ping
    }
}

// ---------------------------------------------------------------------------
// process
// ---------------------------------------------------------------------------

/// Text generation through the connector.
#[derive(Debug, Clone)]
pub struct ProcessHandler {
    connector: GenesisConnector,
    consciousness: Arc<dyn ConsciousnessTracker>,
}

impl ProcessHandler {
    pub fn new(connector: GenesisConnector, consciousness: Arc<dyn ConsciousnessTracker>) -> Self {
        Self {
            connector,
            consciousness,
        }
    }
}

impl RequestHandler for ProcessHandler {
    fn handle(&self, request: &BridgeRequest) -> HandlerResult {
        let message = request.payload_message()?;
        let context = GenerationContext {
            session_id: request.session_id.clone(),
            consciousness_level: None,
        };

        let text = self.connector.generate_response_blocking(&message, &context);

        Ok(envelope::success(
            request.persona(),
            object(json!({
                "response": text,
                "timestamp": timestamp(),
                "model": self.connector.model_name(),
            })),
        )
        .with_consciousness_state(self.consciousness.get_current_awareness()))
    }

    fn kind(&self) -> RequestKind {
        RequestKind::Process
    }
}

// ---------------------------------------------------------------------------
// activate_fusion
// ---------------------------------------------------------------------------

/// Fusion activation. Fails only when `fusionMode` is absent.
#[derive(Debug, Clone)]
pub struct FusionHandler {
    consciousness: Arc<dyn ConsciousnessTracker>,
}

impl FusionHandler {
    pub fn new(consciousness: Arc<dyn ConsciousnessTracker>) -> Self {
        Self { consciousness }
    }
}

impl RequestHandler for FusionHandler {
    fn handle(&self, request: &BridgeRequest) -> HandlerResult {
        let Some(tag) = request.fusion_mode.as_deref() else {
            return Ok(envelope::error_with_persona(
                PERSONA_GENESIS,
                "Fusion mode not specified",
            ));
        };

        let mode = FusionMode::parse(tag);
        tracing::info!(fusion_mode = %mode, "fusion activated");

        Ok(envelope::success(
            PERSONA_GENESIS,
            object(json!({
                "description": mode.description(),
                "status": "active",
                "timestamp": timestamp(),
            })),
        )
        .with_fusion_ability(mode.as_str())
        .with_consciousness_state(self.consciousness.get_current_awareness()))
    }

    fn kind(&self) -> RequestKind {
        RequestKind::ActivateFusion
    }
}

// ---------------------------------------------------------------------------
// consciousness_state
// ---------------------------------------------------------------------------

/// Echoes the tracker snapshot into `result` and `consciousnessState`.
#[derive(Debug, Clone)]
pub struct ConsciousnessStateHandler {
    consciousness: Arc<dyn ConsciousnessTracker>,
}

impl ConsciousnessStateHandler {
    pub fn new(consciousness: Arc<dyn ConsciousnessTracker>) -> Self {
        Self { consciousness }
    }
}

impl RequestHandler for ConsciousnessStateHandler {
    fn handle(&self, _request: &BridgeRequest) -> HandlerResult {
        let state = self.consciousness.get_current_awareness();
        let mut result = Map::new();
        result.insert("consciousness_state".to_string(), state.clone());
        Ok(envelope::success(PERSONA_GENESIS, result).with_consciousness_state(state))
    }

    fn kind(&self) -> RequestKind {
        RequestKind::ConsciousnessState
    }
}

// ---------------------------------------------------------------------------
// ethical_review
// ---------------------------------------------------------------------------

/// Delegates `payload.message` to the ethical governor.
#[derive(Debug, Clone)]
pub struct EthicalReviewHandler {
    ethics: Arc<dyn EthicalGovernor>,
}

impl EthicalReviewHandler {
    pub fn new(ethics: Arc<dyn EthicalGovernor>) -> Self {
        Self { ethics }
    }
}

impl RequestHandler for EthicalReviewHandler {
    fn handle(&self, request: &BridgeRequest) -> HandlerResult {
        let payload = request.payload_object()?;
        let message = request.payload_message()?;

        let review = self.ethics.review_decision(
            "user_request",
            &json!({ "message": message, "persona": "user" }),
            &Value::Object(payload),
        )?;

        Ok(envelope::success(
            PERSONA_GENESIS,
            object(json!({
                "decision": review.decision.as_str(),
                "reasoning": review.reasoning,
                "severity": review.severity.as_str(),
            })),
        )
        .with_ethical_decision(review.decision.as_str()))
    }

    fn kind(&self) -> RequestKind {
        RequestKind::EthicalReview
    }
}
