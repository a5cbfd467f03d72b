//! Command-line arguments for the `sindarin` binary.

use std::path::PathBuf;

use clap::Parser;

/// Lex, parse, and type-check a Sindarin module and everything it imports.
#[derive(Parser, Debug)]
#[command(name = "sindarin", version, about = "Sindarin front end: lex, parse, bind, and type-check a .sn module")]
pub struct CliArgs {
    /// The entry module to compile.
    pub entry: PathBuf,

    /// Treat warnings (e.g. a no-op `as val`/`as ref`) as errors.
    #[arg(long = "warningsAsErrors", alias = "warnings-as-errors")]
    pub warnings_as_errors: bool,

    /// Stop recording new diagnostics once this many have been collected. 0 means unlimited.
    #[arg(long = "maxDiagnostics", alias = "max-diagnostics", default_value_t = 0)]
    pub max_diagnostics: usize,
}
