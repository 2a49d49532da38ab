//! Generation facade.
//!
//! [`GenesisConnector`] wraps an optional [`TextGenerator`]. When a provider
//! is configured the prompt is embedded in the system-context template and
//! sent with the model parameters and safety thresholds; when the provider is
//! missing or the call fails, a deterministic fallback text is returned
//! instead. Neither variant ever returns an error.

pub mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::llms::generator::{GenerationRequest, TextGenerator};
use crate::llms::providers::gemini::GeminiClient;

pub use prompt::{fallback_response, full_prompt, GENESIS_PROFILE, SYSTEM_PROMPT};

/// Optional context accompanying a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub session_id: Option<String>,
    pub consciousness_level: Option<String>,
}

impl GenerationContext {
    /// Context carrying only a session id.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            consciousness_level: None,
        }
    }
}

/// Primary interface for text generation.
#[derive(Debug, Clone)]
pub struct GenesisConnector {
    config: Arc<ModelConfig>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl GenesisConnector {
    /// Create a connector with an explicit provider (or none).
    pub fn new(config: Arc<ModelConfig>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        match &generator {
            Some(g) => tracing::info!(
                provider = g.provider(),
                model = %config.name,
                "generation provider active"
            ),
            None => tracing::warn!(
                model = %config.name,
                "no generation provider configured, using fallback mode"
            ),
        }
        Self { config, generator }
    }

    /// Create a connector using Gemini when an API key is configured.
    pub fn from_config(config: Arc<ModelConfig>) -> Self {
        let generator = GeminiClient::from_config(&config)
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Self::new(config, generator)
    }

    /// The shared model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The configured model name.
    pub fn model_name(&self) -> &str {
        &self.config.name
    }

    /// Whether a provider is configured.
    pub fn is_generation_enabled(&self) -> bool {
        self.generator.is_some()
    }

    fn request_for(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest::from_config(
            &self.config,
            full_prompt(prompt),
            Some(SYSTEM_PROMPT.clone()),
        )
    }

    fn fallback(&self, prompt: &str, context: &GenerationContext) -> String {
        fallback_response(
            prompt,
            &self.config.name,
            context.session_id.as_deref(),
            context.consciousness_level.as_deref(),
        )
    }

    /// Generate a response asynchronously.
    pub async fn generate_response(&self, prompt: &str, context: &GenerationContext) -> String {
        let Some(generator) = &self.generator else {
            return self.fallback(prompt, context);
        };

        match generator.agenerate_content(&self.request_for(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    provider = generator.provider(),
                    error = %e,
                    "generation failed, using fallback"
                );
                self.fallback(prompt, context)
            }
        }
    }

    /// Generate a response, blocking the current thread.
    ///
    /// Same output as [`generate_response`](Self::generate_response) for the
    /// same inputs and the same provider outcome.
    pub fn generate_response_blocking(&self, prompt: &str, context: &GenerationContext) -> String {
        let Some(generator) = &self.generator else {
            return self.fallback(prompt, context);
        };

        match generator.generate_content(&self.request_for(prompt)) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    provider = generator.provider(),
                    error = %e,
                    "generation failed, using fallback"
                );
                self.fallback(prompt, context)
            }
        }
    }
}
