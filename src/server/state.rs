//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::diagnosis::DiagnosisService;
use crate::llm::{self, ProviderResult};

/// Shared application state.
pub struct AppState {
    /// Diagnosis pipeline bound to the configured provider.
    pub service: DiagnosisService,
}

impl AppState {
    /// Wrap an already built service.
    #[must_use]
    pub fn new(service: DiagnosisService) -> Arc<Self> {
        Arc::new(Self { service })
    }

    /// Build the configured provider (and cache) and wrap it.
    ///
    /// Must be called outside the async runtime: the blocking HTTP client
    /// cannot be created or dropped from async context.
    ///
    /// # Errors
    /// Returns an error if the provider client cannot be created.
    pub fn from_config(config: &AppConfig) -> ProviderResult<Arc<Self>> {
        let generator = llm::build_generator(config)?;
        Ok(Self::new(DiagnosisService::new(generator)))
    }
}
