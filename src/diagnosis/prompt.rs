//! Prompt templates for the diagnosis assistant.
//!
//! Two fixed templates: a symptom-only one, and a history-aware one used
//! when the caller supplies patient history. Both ask for the same three
//! labeled sections.

use crate::diagnosis::error::{DiagnosisError, DiagnosisResult};

/// Section labels the model is asked to answer with.
pub const SECTION_LABELS: [&str; 3] = ["Diagnosis:", "Suggested Medicine:", "Precautions:"];

const SYMPTOM_ONLY_PREAMBLE: &str = "You are a certified medical assistant. Based only on the following symptom, provide a possible diagnosis and over-the-counter medicines if appropriate. Do not guess and do not respond if the input is unrelated to health.";

const WITH_HISTORY_PREAMBLE: &str = "You are a certified medical assistant. Use the patient's medical history and current symptoms to provide a possible diagnosis and suggested over-the-counter medicine. If the data is unrelated to health, say \"Not applicable\".";

/// Build the prompt for `symptom`, adding `history` when it is not blank.
///
/// Both inputs are substituted exactly as given; whitespace only decides
/// emptiness. The output depends on nothing else.
///
/// # Errors
/// Returns [`DiagnosisError::Validation`] when `symptom` is blank.
pub fn build(symptom: &str, history: &str) -> DiagnosisResult<String> {
    if symptom.trim().is_empty() {
        return Err(DiagnosisError::Validation(
            "symptom must not be empty".to_string(),
        ));
    }

    let mut out = String::with_capacity(
        WITH_HISTORY_PREAMBLE.len() + symptom.len() + history.len() + 128,
    );
    out.push('\n');

    if history.trim().is_empty() {
        out.push_str(SYMPTOM_ONLY_PREAMBLE);
        out.push_str("\n\nSymptom: ");
        out.push_str(symptom);
    } else {
        out.push_str(WITH_HISTORY_PREAMBLE);
        out.push_str("\n\nPatient History: ");
        out.push_str(history);
        out.push_str("\nCurrent Symptom: ");
        out.push_str(symptom);
    }

    out.push_str("\n\nResponse format:\n");
    for label in SECTION_LABELS {
        out.push_str(label);
        out.push('\n');
    }

    Ok(out)
}
