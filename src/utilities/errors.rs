//! Error types for the Genesis bridge.
//!
//! One enum per seam: configuration, the generative provider, and the
//! request-handling path. Provider errors never leave the generation facade;
//! bridge errors never leave the router (they become error envelopes).

use thiserror::Error;

/// Errors raised while resolving configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was present but could not be parsed.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors from a generative-text provider call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential is configured for the provider.
    #[error("Provider API key not set")]
    MissingApiKey,

    /// The HTTP request could not be sent or the body could not be read.
    #[error("Provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Provider error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The provider body was not the expected shape.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// The provider reported an error object in an otherwise valid body.
    #[error("Provider reported error: {0}")]
    Provider(String),

    /// A local runtime could not be built for a blocking call.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Errors raised while handling a single bridge request.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The request payload does not have the shape the handler needs.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// An external collaborator failed.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Reading or writing the byte stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A request or response could not be (de)serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_key_and_value() {
        let err = ConfigError::Invalid {
            key: "GENESIS_TOP_K".to_string(),
            value: "forty".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GENESIS_TOP_K"));
        assert!(msg.contains("\"forty\""));
    }

    #[test]
    fn test_bridge_error_messages() {
        assert!(BridgeError::InvalidPayload("payload must be an object".into())
            .to_string()
            .starts_with("Invalid payload"));
        assert_eq!(
            BridgeError::Collaborator("governor offline".into()).to_string(),
            "Collaborator error: governor offline"
        );
    }

    #[test]
    fn test_generation_error_status() {
        let err = GenerationError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "Provider error (503): unavailable");
    }
}
