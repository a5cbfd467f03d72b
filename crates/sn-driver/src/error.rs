//! Host-side failures of the driver itself.
//!
//! These are distinct from compiler diagnostics (spec §4.2): a diagnostic is
//! recorded against the `Diagnostics` sink and never stops the checker from
//! continuing, while a `CompileError` aborts the run before any checking can
//! happen at all (a missing file, a cycle in the import graph). A module
//! that fails to *lex* is still just a diagnostic (`DiagnosticKind::LexError`,
//! spec §7) — it stops the pipeline the same way a parse error does, but it
//! is reported the same way, not propagated as a host error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("import cycle detected, starting at {path}")]
    ImportCycle { path: PathBuf },
}
