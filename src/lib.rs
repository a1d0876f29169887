//! Symptom-to-diagnosis assistant backed by a hosted text-generation model, in a strictly linted crate.

// Forbid dangerous or non-idiomatic practices
#![deny(warnings)] // Every warning is an error
#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item must be documented
#![deny(dead_code)] // No unused code
#![deny(non_camel_case_types)]
// Types follow CamelCase

// Nothing slips through
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)] // Results and Options must be handled
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)] // Output goes through explicit writers
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::cognitive_complexity)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

/// Command-line front end.
pub mod cli;
/// Configuration loaded at startup.
pub mod config;
/// Prompt construction and the diagnosis service.
pub mod diagnosis;
/// Text-generation providers and the prompt cache.
pub mod llm;
/// HTTP server and API routes.
#[allow(clippy::unused_async)]
pub mod server;
/// Entry helpers for both binaries.
pub mod start_medi_assist;
