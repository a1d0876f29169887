//! Startup helpers for both front ends.
//!
//! Configuration is loaded once here and handed to the components; nothing
//! below this module reads the environment.

use std::future::Future;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use crate::cli::{self, Cli};
use crate::config::{API_KEY_ENV, AppConfig};
use crate::diagnosis::DiagnosisService;
use crate::llm;
use crate::server::{self, AppState};

/// Run the HTTP server (used by the `medi-assist-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run_server() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting medi-assist v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(
        provider = %config.provider.kind,
        model = %config.provider.model,
        cache = config.cache.enabled,
        "Configuration loaded"
    );
    if config.provider.kind.requires_api_key() && !config.provider.has_api_key() {
        tracing::warn!("{API_KEY_ENV} is not set; diagnose requests will fail until it is");
    }

    // Built before the runtime: the blocking client must live outside it.
    let state = match AppState::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let served = rt.block_on(server::run_server_with_shutdown(
        Arc::clone(&state),
        config.server.port,
        shutdown_signal(),
    ));
    drop(rt);

    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

/// Run the interactive prompt (used by the `medi-assist` binary).
///
/// Exits successfully even when the provider call fails; only configuration
/// and stdin/stdout errors produce a failure code.
#[must_use]
pub fn run_cli(args: &Cli) -> ExitCode {
    // stdout carries the diagnosis only.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let mut stderr = io::stderr().lock();

    let mut config = match AppConfig::from_env() {
        Ok(c) => c.with_cache(false),
        Err(e) => {
            let _ = writeln!(stderr, "Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    if let Some(model) = &args.model {
        config.provider.model.clone_from(model);
    }

    for line in cli::credential_status(&config.provider) {
        let _ = writeln!(stderr, "{line}");
    }

    let generator = match llm::build_generator(&config) {
        Ok(g) => g,
        Err(e) => {
            let _ = writeln!(stderr, "Failed to create provider client: {e}");
            return ExitCode::from(1);
        }
    };
    let service = DiagnosisService::new(generator);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout().lock();
    if let Err(e) = cli::run_prompt(&service, args, &mut input, &mut stdout, &mut stderr) {
        tracing::error!("I/O error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Resolve on Ctrl+C. If the handler cannot be installed, never resolve.
fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    }
}
