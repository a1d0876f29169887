//! Error types for the provider boundary.

use thiserror::Error;

/// Errors produced by a text-generation provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider needs an API key and none was configured.
    #[error("API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// The provider rejected the credential.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Quota or rate limit exceeded.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("provider returned HTTP {0}: {1}")]
    HttpStatus(u16, String),

    /// Transport failure talking to the provider.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be understood.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider answered without any text.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The prompt or the answer was blocked by the provider's safety filter.
    #[error("response blocked by provider: {0}")]
    Blocked(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and its body to an error.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(body),
            429 => Self::RateLimited(body),
            // Gemini reports a bad key as 400 INVALID_ARGUMENT.
            400 if body.contains("API key not valid") || body.contains("API_KEY_INVALID") => {
                Self::Unauthorized(body)
            }
            _ => Self::HttpStatus(status, body),
        }
    }
}

/// Convenience result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
