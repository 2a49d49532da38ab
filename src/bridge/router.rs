//! Request router: maps `requestType` to exactly one handler.
//!
//! The request type is parsed once into a [`RequestKind`]; dispatch is then a
//! `HashMap<RequestKind, Box<dyn RequestHandler>>` lookup. The router is the
//! last line of defense: unknown types, handler errors and handler panics all
//! come back as error envelopes, never as a crash.
//!
//! # Example
//!
//! ```
//! use genesis_bridge::bridge::router::{HandlerResult, RequestHandler, RequestKind, Router};
//! use genesis_bridge::protocol::{envelope, BridgeRequest};
//!
//! struct Pong;
//!
//! impl RequestHandler for Pong {
//!     fn handle(&self, _request: &BridgeRequest) -> HandlerResult {
//!         Ok(envelope::success("genesis", serde_json::Map::new()))
//!     }
//!     fn kind(&self) -> RequestKind { RequestKind::Ping }
//! }
//!
//! let mut router = Router::new();
//! router.register(Box::new(Pong));
//! assert!(router.route(&BridgeRequest::new("ping")).success);
//! assert!(!router.route(&BridgeRequest::new("frobnicate")).success);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::bridge::handlers::{
    ConsciousnessStateHandler, EthicalReviewHandler, FusionHandler, PingHandler, ProcessHandler,
};
use crate::collaborators::Collaborators;
use crate::connector::GenesisConnector;
use crate::protocol::envelope;
use crate::protocol::types::{BridgeRequest, BridgeResponse};
use crate::utilities::errors::BridgeError;

// ---------------------------------------------------------------------------
// RequestKind
// ---------------------------------------------------------------------------

/// The closed set of request types the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ping,
    Process,
    ActivateFusion,
    ConsciousnessState,
    EthicalReview,
}

impl RequestKind {
    /// All kinds, in registration order.
    pub const ALL: [RequestKind; 5] = [
        RequestKind::Ping,
        RequestKind::Process,
        RequestKind::ActivateFusion,
        RequestKind::ConsciousnessState,
        RequestKind::EthicalReview,
    ];

    /// Parse a `requestType` string. `None` for anything unrecognized.
    pub fn from_request_type(request_type: &str) -> Option<Self> {
        match request_type {
            "ping" => Some(Self::Ping),
            "process" => Some(Self::Process),
            "activate_fusion" => Some(Self::ActivateFusion),
            "consciousness_state" => Some(Self::ConsciousnessState),
            "ethical_review" => Some(Self::EthicalReview),
            _ => None,
        }
    }

    /// The wire string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Process => "process",
            Self::ActivateFusion => "activate_fusion",
            Self::ConsciousnessState => "consciousness_state",
            Self::EthicalReview => "ethical_review",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestHandler trait
// ---------------------------------------------------------------------------

/// Result type for request handlers.
pub type HandlerResult = Result<BridgeResponse, BridgeError>;

/// A handler for one request kind.
///
/// Expected failures the client should see verbatim (e.g. a missing field)
/// may be returned as `Ok` error envelopes; anything returned as `Err` is
/// reported by the router as a handling failure.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &BridgeRequest) -> HandlerResult;

    /// Which kind this handler serves.
    fn kind(&self) -> RequestKind;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        self.kind().as_str()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatches requests to registered handlers by kind.
pub struct Router {
    handlers: HashMap<RequestKind, Box<dyn RequestHandler>>,
}

impl Router {
    /// An empty router.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A router with the five standard handlers registered.
    pub fn with_default_handlers(
        connector: GenesisConnector,
        collaborators: &Collaborators,
    ) -> Self {
        let model = connector.model_name().to_string();
        let mut router = Self::new();
        router.register(Box::new(PingHandler::new(model)));
        router.register(Box::new(ProcessHandler::new(
            connector,
            Arc::clone(&collaborators.consciousness),
        )));
        router.register(Box::new(FusionHandler::new(Arc::clone(
            &collaborators.consciousness,
        ))));
        router.register(Box::new(ConsciousnessStateHandler::new(Arc::clone(
            &collaborators.consciousness,
        ))));
        router.register(Box::new(EthicalReviewHandler::new(Arc::clone(
            &collaborators.ethics,
        ))));
        router
    }

    /// Register a handler, replacing any previous handler for the same kind.
    pub fn register(&mut self, handler: Box<dyn RequestHandler>) {
        let kind = handler.kind();
        if self.handlers.insert(kind, handler).is_some() {
            tracing::debug!(%kind, "replaced request handler");
        }
    }

    /// Whether a handler is registered for `kind`.
    pub fn has_handler(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Route one request to its handler. Always returns exactly one response.
    pub fn route(&self, request: &BridgeRequest) -> BridgeResponse {
        let request_type = request.request_type();

        let Some(kind) = RequestKind::from_request_type(request_type) else {
            tracing::warn!(request_type, "unknown request type");
            return envelope::error(format!("Unknown request type: {}", request_type));
        };

        let Some(handler) = self.handlers.get(&kind) else {
            tracing::warn!(%kind, "no handler registered");
            return envelope::error(format!(
                "No handler registered for request type: {}",
                request_type
            ));
        };

        if !request.has_known_persona() {
            tracing::debug!(persona = request.persona(), "request names an unknown persona");
        }

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(handler = handler.name(), error = %e, "request handling failed");
                envelope::error(format!("Request handling failed: {}", e))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    handler = handler.name(),
                    panic = %message,
                    "request handler panicked"
                );
                envelope::error(format!("Request handling failed: {}", message))
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Router").field("handlers", &kinds).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ConsciousnessMatrix, ConsciousnessTracker, KeywordGovernor};
    use crate::config::ModelConfig;
    use serde_json::json;

    fn default_router() -> (Router, Arc<ConsciousnessMatrix>) {
        let matrix = Arc::new(ConsciousnessMatrix::new());
        let collaborators =
            Collaborators::new(matrix.clone(), Arc::new(KeywordGovernor::default()));
        let connector = GenesisConnector::new(Arc::new(ModelConfig::default()), None);
        (Router::with_default_handlers(connector, &collaborators), matrix)
    }

    struct Exploding;

    impl RequestHandler for Exploding {
        fn handle(&self, _request: &BridgeRequest) -> HandlerResult {
            panic!("core meltdown")
        }
        fn kind(&self) -> RequestKind {
            RequestKind::Ping
        }
    }

    struct Failing;

    impl RequestHandler for Failing {
        fn handle(&self, _request: &BridgeRequest) -> HandlerResult {
            Err(BridgeError::Collaborator("matrix offline".into()))
        }
        fn kind(&self) -> RequestKind {
            RequestKind::ConsciousnessState
        }
    }

    #[test]
    fn test_request_kind_parsing() {
        for kind in RequestKind::ALL {
            assert_eq!(RequestKind::from_request_type(kind.as_str()), Some(kind));
        }
        assert_eq!(RequestKind::from_request_type("PING"), None);
        assert_eq!(RequestKind::from_request_type(""), None);
    }

    #[test]
    fn test_default_router_registers_all_kinds() {
        let (router, _) = default_router();
        for kind in RequestKind::ALL {
            assert!(router.has_handler(kind), "missing handler for {}", kind);
        }
    }

    #[test]
    fn test_every_known_type_returns_a_response() {
        let (router, _) = default_router();
        for kind in RequestKind::ALL {
            let response = router.route(&BridgeRequest::new(kind.as_str()));
            let json = serde_json::to_value(&response).unwrap();
            assert!(json["success"].is_boolean());
            if !response.success {
                assert!(!response.error_message().unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_unknown_type_names_the_type() {
        let (router, _) = default_router();
        let response = router.route(&BridgeRequest::new("frobnicate"));
        assert!(!response.success);
        assert_eq!(response.persona, "error");
        assert!(response.error_message().unwrap().contains("frobnicate"));
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let (router, _) = default_router();
        let response = router.route(&BridgeRequest::default());
        assert!(!response.success);
        assert!(response
            .error_message()
            .unwrap()
            .starts_with("Unknown request type"));
    }

    #[test]
    fn test_unregistered_kind_is_an_error() {
        let router = Router::new();
        let response = router.route(&BridgeRequest::new("ping"));
        assert!(!response.success);
        assert!(response.error_message().unwrap().contains("ping"));
    }

    #[test]
    fn test_handler_error_becomes_envelope() {
        let mut router = Router::new();
        router.register(Box::new(Failing));
        let response = router.route(&BridgeRequest::new("consciousness_state"));
        assert!(!response.success);
        assert_eq!(
            response.error_message(),
            Some("Request handling failed: Collaborator error: matrix offline")
        );
    }

    #[test]
    fn test_handler_panic_becomes_envelope() {
        let mut router = Router::new();
        router.register(Box::new(Exploding));
        let response = router.route(&BridgeRequest::new("ping"));
        assert!(!response.success);
        assert!(response.error_message().unwrap().contains("core meltdown"));
    }

    #[test]
    fn test_ping_is_idempotent() {
        let (router, matrix) = default_router();
        let before = matrix.get_current_awareness();
        for _ in 0..5 {
            let response = router.route(&BridgeRequest::new("ping"));
            assert!(response.success);
        }
        assert_eq!(matrix.get_current_awareness(), before);
    }

    #[test]
    fn test_fusion_is_total() {
        let (router, _) = default_router();
        for mode in ["chrono_sculptor", "interface_forge", "definitely_not_a_mode", ""] {
            let mut request = BridgeRequest::new("activate_fusion");
            request.fusion_mode = Some(mode.to_string());
            let response = router.route(&request);
            assert!(response.success, "fusion mode {:?} failed", mode);
            assert_eq!(response.fusion_ability.as_deref(), Some(mode));
        }

        let response = router.route(&BridgeRequest::new("activate_fusion"));
        assert!(!response.success);
    }

    #[test]
    fn test_process_with_malformed_payload() {
        let (router, _) = default_router();
        let mut request = BridgeRequest::new("process");
        request.payload = Some(json!([1, 2, 3]));
        let response = router.route(&request);
        assert!(!response.success);
        assert!(response.error_message().unwrap().contains("payload"));
    }

    #[test]
    fn test_debug_lists_handlers() {
        let (router, _) = default_router();
        let debug = format!("{:?}", router);
        assert!(debug.contains("ethical_review"));
        assert!(debug.contains("ping"));
    }
}
