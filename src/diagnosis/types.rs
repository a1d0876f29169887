//! Request and response values for one diagnosis exchange.

use serde::{Deserialize, Serialize};

/// A symptom plus optional patient history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    /// Free-text symptom description.
    pub symptom: String,
    /// Free-text patient history; empty when unknown.
    #[serde(default)]
    pub history: String,
}

impl DiagnosisRequest {
    /// Create a request with no history.
    #[must_use]
    pub fn new(symptom: impl Into<String>) -> Self {
        Self {
            symptom: symptom.into(),
            history: String::new(),
        }
    }

    /// Attach patient history.
    #[must_use]
    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = history.into();
        self
    }
}

/// The provider's reply, trimmed but otherwise untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    /// Raw model text.
    pub result: String,
}
