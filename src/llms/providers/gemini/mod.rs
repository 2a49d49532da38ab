//! Google Gemini REST provider.
//!
//! Calls the Generative Language API `generateContent` endpoint with the
//! system instruction, sampling parameters and safety settings carried by a
//! [`GenerationRequest`].
//!
//! # Authentication
//!
//! The API key is sent as the `key` query parameter. The key comes from
//! [`ModelConfig`](crate::config::ModelConfig), never from the environment
//! directly.
//!
//! No retries are attempted; a failed call is reported once and the caller
//! decides what to do.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::llms::generator::{GenerationRequest, TextGenerator};
use crate::utilities::errors::GenerationError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Create a client from the model configuration.
    ///
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let api_key = config.api_key.as_ref()?;
        let mut client = Self::new(api_key.clone());
        client.timeout = config.request_timeout;
        Some(client)
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set an HTTP timeout for each call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The `generateContent` URL for a model.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Build the JSON request body.
    pub fn build_request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "topP": request.top_p,
                "topK": request.top_k,
                "maxOutputTokens": request.max_output_tokens,
            },
            "safetySettings": request.safety_settings,
        });

        if let Some(ref system) = request.system_instruction {
            body["systemInstruction"] = json!({
                "parts": [{ "text": system }]
            });
        }

        body
    }

    /// Extract the generated text from a response body.
    ///
    /// The text is the concatenation of the first candidate's text parts.
    pub fn parse_response(response: &Value) -> Result<String, GenerationError> {
        if let Some(error) = response.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Gemini API error");
            return Err(GenerationError::Provider(msg.to_string()));
        }

        let candidate = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| GenerationError::Malformed("no candidates in response".into()))?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| GenerationError::Malformed("no content.parts in candidate".into()))?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn generate_content(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        log::debug!("GeminiClient.generate_content: model={}", request.model);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.agenerate_content(request))
    }

    async fn agenerate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        log::debug!(
            "GeminiClient.agenerate_content: model={}, prompt_len={}",
            request.model,
            request.prompt.len()
        );

        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let response = client
            .post(self.endpoint(&request.model))
            .header("content-type", "application/json")
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request_body(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            GenerationError::Malformed(format!(
                "{} - Body: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;

        if let Some(usage) = body.get("usageMetadata") {
            log::debug!("Gemini usage: {}", usage);
        }

        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::generator::default_safety_settings;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "SYSTEM\n\nUser: hello".into(),
            system_instruction: Some("SYSTEM".into()),
            temperature: 0.8,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 8192,
            safety_settings: default_safety_settings(),
        }
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(GeminiClient::from_config(&ModelConfig::default()).is_none());

        let config = ModelConfig {
            api_key: Some("k".into()),
            request_timeout: Some(Duration::from_secs(5)),
            ..ModelConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("k").with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client = GeminiClient::new("super-secret");
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn test_build_request_body() {
        let body = GeminiClient::build_request_body(&sample_request());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "SYSTEM\n\nUser: hello");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "SYSTEM");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(
            body["safetySettings"][1]["category"],
            "HARM_CATEGORY_HATE_SPEECH"
        );
    }

    #[test]
    fn test_parse_response_joins_text_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[Genesis] " }, { "text": "Hello." }] }
            }]
        });
        assert_eq!(GeminiClient::parse_response(&response).unwrap(), "[Genesis] Hello.");
    }

    #[test]
    fn test_parse_response_errors() {
        let err = GeminiClient::parse_response(&json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));

        let err = GeminiClient::parse_response(&json!({
            "error": { "message": "API key not valid" }
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Provider reported error: API key not valid");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = GeminiClient::new("k")
            .with_base_url("http://127.0.0.1:1/v1beta")
            .with_timeout(Duration::from_secs(2));
        let err = client.agenerate_content(&sample_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[test]
    fn test_empty_key_rejected_without_network() {
        let client = GeminiClient::new("");
        let err = client.generate_content(&sample_request()).unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
