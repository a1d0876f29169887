//! Local Ollama backend.
//!
//! Behaviour:
//! - Blocking `POST /api/generate` with `stream: false`.
//! - Runtime options are sent on every request (`num_ctx`, `num_predict`).
//! - No credential; the API key setting is ignored.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::llm::TextGenerator;
use crate::llm::error::{ProviderError, ProviderResult};

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Target context length (tokens).
const CONTEXT_LENGTH: u32 = 8_192;

/// Default token budget for generation.
const DEFAULT_NUM_PREDICT: u32 = 512;

/// Keep the model loaded between requests.
const KEEP_ALIVE: &str = "5m";

#[derive(Serialize)]
struct GenerateOptions {
    num_ctx: u32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    keep_alive: &'a str,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Blocking Ollama client bound to one model.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    num_predict: u32,
    temperature: Option<f32>,
}

impl OllamaClient {
    /// Build a client from provider settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model: config.model.clone(),
            num_predict: config.max_output_tokens.unwrap_or(DEFAULT_NUM_PREDICT),
            temperature: config.temperature,
        })
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: GenerateOptions {
                num_ctx: CONTEXT_LENGTH,
                num_predict: self.num_predict,
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending request to Ollama");

        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let response = self.client.post(&url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body = response
            .json::<GenerateResponse>()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        extract_response(body)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn extract_response(body: GenerateResponse) -> ProviderResult<String> {
    match body.response {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(ProviderError::EmptyResponse),
        None => Err(ProviderError::MalformedResponse(
            "missing `response` field".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_response() {
        let ok: GenerateResponse =
            serde_json::from_str(r#"{"model":"m","response":" Diagnosis: Cold ","done":true}"#).unwrap();
        assert_eq!(extract_response(ok).unwrap(), " Diagnosis: Cold ");

        let missing: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(matches!(
            extract_response(missing),
            Err(ProviderError::MalformedResponse(_))
        ));

        let blank: GenerateResponse = serde_json::from_str(r#"{"response":""}"#).unwrap();
        assert!(matches!(extract_response(blank), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_request_carries_options() {
        let request = GenerateRequest {
            model: "mistral",
            prompt: "p",
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: GenerateOptions {
                num_ctx: CONTEXT_LENGTH,
                num_predict: 64,
                temperature: None,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_ctx"], 8192);
        assert_eq!(value["options"]["num_predict"], 64);
        assert!(value["options"].get("temperature").is_none());
    }
}
