//! Wire protocol for the Genesis bridge.
//!
//! Strict newline-delimited JSON: one request object per input line, one
//! response object per output line, no framing beyond `\n`.
//!
//! # Modules
//!
//! - [`types`] — `BridgeRequest`, `BridgeResponse`, persona constants
//! - [`envelope`] — success/error envelope builders and line serialization

pub mod envelope;
pub mod types;

pub use envelope::{
    error, error_with_persona, success, timestamp, to_line, CRITICAL_ERROR_LINE, READY_SENTINEL,
};
pub use types::{BridgeRequest, BridgeResponse, KNOWN_PERSONAS, PERSONA_ERROR, PERSONA_GENESIS};
