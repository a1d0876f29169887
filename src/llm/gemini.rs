//! Google Generative Language (Gemini) backend.
//!
//! Blocking client for `POST {base}/models/{model}:generateContent`. The
//! credential travels in the `x-goog-api-key` header. A missing key does not
//! prevent construction; it is reported on the first call instead.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::llm::TextGenerator;
use crate::llm::error::{ProviderError, ProviderResult};

/// Default Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reason reported when the safety filter stopped generation.
const FINISH_SAFETY: &str = "SAFETY";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Blocking Gemini client bound to one model.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    generation: Option<GenerationConfig>,
}

impl GeminiClient {
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

        let generation = if config.temperature.is_some() || config.max_output_tokens.is_some() {
            Some(GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            })
        } else {
            None
        };

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            model: normalize_model(&config.model).to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            generation,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.generation,
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body = response
            .json::<GenerateContentResponse>()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        extract_text(body)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Accept both `gemini-1.5-flash` and `models/gemini-1.5-flash`.
fn normalize_model(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

fn extract_text(response: GenerateContentResponse) -> ProviderResult<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some(FINISH_SAFETY) {
        return Err(ProviderError::Blocked(FINISH_SAFETY.to_string()));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Diagnosis: Flu\n"},{"text":"Precautions: rest"}]},"finishReason":"STOP"}]}"#,
        );
        let text = extract_text(body).unwrap();
        assert_eq!(text, "Diagnosis: Flu\nPrecautions: rest");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let body = parse(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#);
        assert!(matches!(extract_text(body), Err(ProviderError::Blocked(r)) if r == "OTHER"));
    }

    #[test]
    fn test_extract_text_safety_finish() {
        let body = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(extract_text(body), Err(ProviderError::Blocked(_))));
    }

    #[test]
    fn test_extract_text_empty() {
        assert!(matches!(
            extract_text(parse(r#"{"candidates":[]}"#)),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(parse(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.5),
                max_output_tokens: None,
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert!(value["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_normalize_model() {
        assert_eq!(normalize_model("models/gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(normalize_model("gemini-1.5-flash"), "gemini-1.5-flash");
    }

    #[test]
    fn test_missing_key_fails_on_first_call() {
        let config = ProviderConfig::default();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.model_id(), "gemini-1.5-flash");
        assert!(matches!(client.generate("x"), Err(ProviderError::MissingApiKey)));
    }
}
