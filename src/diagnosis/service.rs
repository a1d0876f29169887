//! Diagnosis service: prompt in, trimmed provider text out.

use tracing::{debug, warn};

use crate::diagnosis::error::DiagnosisResult;
use crate::diagnosis::prompt;
use crate::diagnosis::types::{DiagnosisRequest, DiagnosisResponse};
use crate::llm::{CacheStats, ProviderResult, TextGenerator};

/// Sends prompts to a [`TextGenerator`] and returns its answers.
pub struct DiagnosisService {
    generator: Box<dyn TextGenerator>,
}

impl DiagnosisService {
    /// Create a service over `generator`.
    #[must_use]
    pub fn new(generator: impl TextGenerator + 'static) -> Self {
        Self {
            generator: Box::new(generator),
        }
    }

    /// Send `prompt` unchanged and return the answer with surrounding
    /// whitespace stripped.
    ///
    /// # Errors
    /// Returns the provider's error unchanged.
    pub fn invoke(&self, prompt: &str) -> ProviderResult<String> {
        debug!(model = self.generator.model_id(), prompt_len = prompt.len(), "Invoking provider");
        match self.generator.generate(prompt) {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                warn!(model = self.generator.model_id(), error = %e, "Provider call failed");
                Err(e)
            }
        }
    }

    /// Build the prompt for `request` and invoke the provider.
    ///
    /// # Errors
    /// Returns a validation error for an empty symptom, or the provider error.
    pub fn diagnose(&self, request: &DiagnosisRequest) -> DiagnosisResult<DiagnosisResponse> {
        let prompt = prompt::build(&request.symptom, &request.history)?;
        let result = self.invoke(&prompt)?;
        Ok(DiagnosisResponse { result })
    }

    /// Identifier of the model answering.
    #[must_use]
    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    /// Prompt cache statistics, if a cache is in front of the provider.
    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.generator.cache_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::error::DiagnosisError;
    use crate::llm::ProviderError;
    use std::sync::Mutex;

    /// Returns a fixed reply and remembers the prompts it saw.
    struct StubGenerator {
        reply: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for StubGenerator {
        fn generate(&self, prompt: &str) -> ProviderResult<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|reason| ProviderError::HttpStatus(503, reason))
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_invoke_trims_output() {
        let service = DiagnosisService::new(StubGenerator::ok("  Diagnosis: X\n"));
        assert_eq!(service.invoke("prompt").unwrap(), "Diagnosis: X");
    }

    #[test]
    fn test_invoke_keeps_inner_text_verbatim() {
        let reply = "Diagnosis: Flu\n\n  Suggested Medicine: rest  \nPrecautions: fluids";
        let service = DiagnosisService::new(StubGenerator::ok(reply));
        assert_eq!(service.invoke("p").unwrap(), reply);
    }

    #[test]
    fn test_invoke_passes_prompt_as_is() {
        let stub = std::sync::Arc::new(StubGenerator::ok("ok"));
        let service = DiagnosisService::new(std::sync::Arc::clone(&stub));
        service.invoke("  exact prompt \n").unwrap();
        assert_eq!(*stub.seen.lock().unwrap(), vec!["  exact prompt \n".to_string()]);
    }

    #[test]
    fn test_invoke_surfaces_provider_error() {
        let service = DiagnosisService::new(StubGenerator::failing("overloaded"));
        assert!(matches!(
            service.invoke("p"),
            Err(ProviderError::HttpStatus(503, _))
        ));
    }

    #[test]
    fn test_diagnose_builds_prompt() {
        let stub = std::sync::Arc::new(StubGenerator::ok("Diagnosis: Flu"));
        let service = DiagnosisService::new(std::sync::Arc::clone(&stub));

        let response = service
            .diagnose(&DiagnosisRequest::new("fever").with_history("none"))
            .unwrap();

        assert_eq!(response.result, "Diagnosis: Flu");
        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Current Symptom: fever"));
    }

    #[test]
    fn test_diagnose_rejects_empty_symptom_without_calling_provider() {
        let stub = std::sync::Arc::new(StubGenerator::ok("unused"));
        let service = DiagnosisService::new(std::sync::Arc::clone(&stub));

        let err = service.diagnose(&DiagnosisRequest::new("   ")).unwrap_err();

        assert!(err.is_validation());
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_diagnose_wraps_provider_error() {
        let service = DiagnosisService::new(StubGenerator::failing("down"));
        let err = service.diagnose(&DiagnosisRequest::new("fever")).unwrap_err();
        assert!(matches!(err, DiagnosisError::Provider(_)));
    }

    #[test]
    fn test_model_id_and_no_cache() {
        let service = DiagnosisService::new(StubGenerator::ok("x"));
        assert_eq!(service.model_id(), "stub");
        assert!(service.cache_stats().is_none());
    }
}
