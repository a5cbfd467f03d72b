//! Compiler-wide configuration, threaded through every phase.
//!
//! Lives in the common crate specifically so every phase can share it
//! without creating a circular dependency between crates. "One small
//! struct, passed by reference everywhere" keeps configuration out of
//! individual function signatures.

/// Options controlling one compilation run.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Stop recording new diagnostics once this many have been collected.
    /// `0` means unlimited.
    pub max_diagnostics: usize,
    /// Treat warnings (e.g. a no-op `as val` on a primitive) as errors.
    pub warnings_as_errors: bool,
    /// The entry module's source filename, used as the default `file` field
    /// on diagnostics emitted before a more specific token is available.
    pub entry_file: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            max_diagnostics: 0,
            warnings_as_errors: false,
            entry_file: String::from("<input>"),
        }
    }
}

impl CompilerOptions {
    #[must_use]
    pub fn for_file(entry_file: impl Into<String>) -> Self {
        CompilerOptions {
            entry_file: entry_file.into(),
            ..Default::default()
        }
    }
}
