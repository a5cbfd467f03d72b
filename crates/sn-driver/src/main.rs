//! Entry point for the `sindarin` binary.

use std::process::ExitCode;

use clap::Parser;
use sn_common::diagnostics::DiagnosticCategory;
use sn_common::CompilerOptions;
use sn_driver::{compile, CliArgs};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false).init();

    let args = CliArgs::parse();
    let mut options = CompilerOptions::for_file(args.entry.display().to_string());
    options.warnings_as_errors = args.warnings_as_errors;
    options.max_diagnostics = args.max_diagnostics;

    tracing::debug!(entry = %args.entry.display(), "starting compilation");

    let outcome = match compile(&args.entry, &options) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("sindarin: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut saw_error = outcome.had_error;
    for diagnostic in &outcome.diagnostics {
        println!("{diagnostic}");
        if options.warnings_as_errors && diagnostic.category == DiagnosticCategory::Warning {
            saw_error = true;
        }
    }

    if saw_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
