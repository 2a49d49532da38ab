//! Generative-text provider seam.
//!
//! A [`TextGenerator`] takes a fully built [`GenerationRequest`] (model,
//! prompt, sampling parameters, safety thresholds) and returns the provider's
//! text verbatim. Providers may fail in any way; absorbing those failures is
//! the connector's job, not the provider's.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::utilities::errors::GenerationError;

// ---------------------------------------------------------------------------
// Safety settings
// ---------------------------------------------------------------------------

/// Harm categories filtered on every generation call.
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Threshold applied to every category.
pub const BLOCK_MEDIUM_AND_ABOVE: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// One content-safety threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// The four default safety settings, each at "block medium and above".
pub fn default_safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: (*category).to_string(),
            threshold: BLOCK_MEDIUM_AND_ABOVE.to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Everything a provider needs for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    /// The full user turn, already embedded in the system-context template.
    pub prompt: String,
    /// System instruction sent alongside the prompt.
    pub system_instruction: Option<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationRequest {
    /// Build a request from the model configuration.
    pub fn from_config(
        config: &ModelConfig,
        prompt: impl Into<String>,
        system_instruction: Option<String>,
    ) -> Self {
        Self {
            model: config.name.clone(),
            prompt: prompt.into(),
            system_instruction,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            safety_settings: default_safety_settings(),
        }
    }
}

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

/// A generative-text provider.
///
/// Both variants must behave identically for identical inputs; the blocking
/// one exists for callers that run outside an async context.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// Provider name for logging.
    fn provider(&self) -> &str;

    /// Generate text, blocking the current thread.
    ///
    /// Must not be called from inside an async task; use
    /// [`agenerate_content`](Self::agenerate_content) there.
    fn generate_content(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Generate text asynchronously.
    async fn agenerate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;
}
