//! Diagnosis HTTP server binary.
//! Run with: cargo run --bin medi-assist-server

use std::process::ExitCode;

use medi_assist::start_medi_assist;

fn main() -> ExitCode {
    start_medi_assist::run_server()
}
