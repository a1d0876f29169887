//! Text-generation provider boundary.
//!
//! The rest of the crate only sees [`TextGenerator`]. Concrete backends
//! (Gemini, Ollama) and the memoizing decorator all implement it.

pub mod cache;
pub mod error;
pub mod gemini;
pub mod ollama;

pub use cache::{CacheStats, CachedGenerator, PromptCache};
pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, ProviderKind};

/// A blocking capability that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` as-is and return the provider's raw text.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] on any failure of the upstream call.
    fn generate(&self, prompt: &str) -> ProviderResult<String>;

    /// Identifier of the model answering the prompts.
    fn model_id(&self) -> &str;

    /// Statistics of the memoization cache, when one is in front.
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn generate(&self, prompt: &str) -> ProviderResult<String> {
        (**self).generate(prompt)
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        (**self).cache_stats()
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, prompt: &str) -> ProviderResult<String> {
        (**self).generate(prompt)
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        (**self).cache_stats()
    }
}

/// Build the configured backend, wrapped in a cache when enabled.
///
/// # Errors
/// Returns an error if the backend HTTP client cannot be built.
pub fn build_generator(config: &AppConfig) -> ProviderResult<Box<dyn TextGenerator>> {
    let backend: Box<dyn TextGenerator> = match config.provider.kind {
        ProviderKind::Gemini => Box::new(GeminiClient::new(&config.provider)?),
        ProviderKind::Ollama => Box::new(OllamaClient::new(&config.provider)?),
    };
    info!(
        provider = %config.provider.kind,
        model = backend.model_id(),
        "Text generator ready"
    );

    if config.cache.enabled {
        let cache = Arc::new(PromptCache::new(config.cache.clone()));
        Ok(Box::new(CachedGenerator::new(backend, cache)))
    } else {
        Ok(backend)
    }
}
