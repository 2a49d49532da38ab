//! # Genesis Bridge
//!
//! A line-oriented request/response bridge between a foreground client and
//! the Genesis generative backend.
//!
//! The client writes one JSON request per line on stdin; the bridge answers
//! each with exactly one JSON response line on stdout, in the order the
//! requests were received. The first line the bridge ever writes is the
//! readiness sentinel `Genesis Ready`.
//!
//! Layout:
//!
//! - [`config`] - environment-driven model and loop settings
//! - [`protocol`] - wire types and response envelopes
//! - [`llms`] - text generation trait and the Gemini provider
//! - [`connector`] - system prompt, generation with offline fallback
//! - [`collaborators`] - consciousness tracker and ethical governor
//! - [`bridge`] - router, handlers and the dual-loop server
//! - [`utilities`] - error types

pub mod bridge;
pub mod collaborators;
pub mod config;
pub mod connector;
pub mod llms;
pub mod protocol;
pub mod utilities;

pub use bridge::{GenesisBridgeServer, Router, ShutdownHandle, StopReason};
pub use collaborators::Collaborators;
pub use config::{BridgeSettings, ModelConfig};
pub use connector::GenesisConnector;
pub use protocol::{BridgeRequest, BridgeResponse};
pub use utilities::errors::{BridgeError, ConfigError, GenerationError};
