//! Symptom → prompt → provider → text.

pub mod error;
pub mod prompt;
pub mod service;
pub mod types;

pub use error::{DiagnosisError, DiagnosisResult};
pub use service::DiagnosisService;
pub use types::{DiagnosisRequest, DiagnosisResponse};
