//! Interactive command-line front end.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::config::{API_KEY_ENV, ProviderConfig};
use crate::diagnosis::{DiagnosisRequest, DiagnosisService};

/// Ask the assistant about one health symptom.
#[derive(Debug, Default, Parser)]
#[command(name = "medi-assist", version)]
pub struct Cli {
    /// Symptom to diagnose; read from stdin when omitted.
    #[arg(long, short)]
    pub symptom: Option<String>,
    /// Optional patient history added to the prompt.
    #[arg(long, default_value = "")]
    pub history: String,
    /// Model identifier overriding `MEDI_ASSIST_MODEL`.
    #[arg(long)]
    pub model: Option<String>,
}

/// One-line credential status, plus a warning when a required key is absent.
#[must_use]
pub fn credential_status(provider: &ProviderConfig) -> Vec<String> {
    if !provider.kind.requires_api_key() {
        return vec![format!("Provider {} needs no API key", provider.kind)];
    }
    if provider.has_api_key() {
        vec!["Loaded API key: yes".to_string()]
    } else {
        vec![
            "Loaded API key: no".to_string(),
            format!("Warning: {API_KEY_ENV} is not set; the provider call will fail"),
        ]
    }
}

/// Ask for a symptom if needed, call the service and print the outcome.
///
/// Provider and validation failures are printed to `err` and are not
/// returned: the caller still exits successfully.
///
/// # Errors
/// Returns an error only if reading `input` or writing the output fails.
pub fn run_prompt<R, W, E>(
    service: &DiagnosisService,
    cli: &Cli,
    input: &mut R,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let symptom = if let Some(symptom) = &cli.symptom {
        symptom.clone()
    } else {
        write!(out, "Enter your health symptom: ")?;
        out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        let kept = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(kept);
        line
    };

    writeln!(out, "Calling {}...", service.model_id())?;

    let request = DiagnosisRequest::new(symptom).with_history(cli.history.as_str());
    match service.diagnose(&request) {
        Ok(response) => {
            writeln!(out, "AI Diagnosis and Prescription:")?;
            writeln!(out, "{}", response.result)?;
        }
        Err(e) => {
            tracing::warn!("Diagnosis failed: {e}");
            writeln!(err, "Error: {e}")?;
        }
    }
    Ok(())
}
