//! Binary entrypoint for the interactive symptom prompt.

use std::process::ExitCode;

use clap::Parser;
use medi_assist::cli::Cli;
use medi_assist::start_medi_assist;

/// Ask for one symptom, print the assistant's answer.
fn main() -> ExitCode {
    start_medi_assist::run_cli(&Cli::parse())
}
