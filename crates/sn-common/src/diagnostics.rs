//! Diagnostic sink — spec §4.2 / §7.
//!
//! A `Diagnostic` struct plus a `DiagnosticCategory` (warning vs. error),
//! with a closed, hand-written `DiagnosticKind` enum rather than an
//! auto-generated, data-driven message table — Sindarin's diagnostic
//! taxonomy is the fixed list in spec §7, not an open, versioned code
//! space.

use std::cell::Cell;

use crate::position::LineMap;

/// Diagnostic category: whether a diagnostic fails the compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// The closed taxonomy of diagnostic kinds from spec §7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    LexError,
    ParseError,
    UndefinedSymbol,
    RedeclaredSymbol,
    TypeMismatch,
    InvalidOperand,
    ArityMismatch,
    NoSuchMember,
    PointerOutsideNative,
    PointerArithmeticForbidden,
    AsValOnNonPointer,
    AsRefNonPrimitive,
    AsRefOnParam,
    NativeLambdaCapture,
    NativeCallbackNonCompat,
    PrivateEscape,
    PointerSliceStep,
    EmptyInitializerNoType,
    AllocationExhausted,
}

impl DiagnosticKind {
    /// Whether this kind is inherently a warning rather than an error.
    /// Every kind in §7's taxonomy is an error except the memory-qualifier
    /// no-ops flagged in §4.7.4 (`as val`/`as ref` on a primitive), which the
    /// checker reports through `warn_at` directly rather than through this
    /// table — so this is `Error` for every listed kind.
    #[must_use]
    pub const fn default_category(self) -> DiagnosticCategory {
        DiagnosticCategory::Error
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DiagnosticKind::LexError => "LexError",
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::UndefinedSymbol => "UndefinedSymbol",
            DiagnosticKind::RedeclaredSymbol => "RedeclaredSymbol",
            DiagnosticKind::TypeMismatch => "TypeMismatch",
            DiagnosticKind::InvalidOperand => "InvalidOperand",
            DiagnosticKind::ArityMismatch => "ArityMismatch",
            DiagnosticKind::NoSuchMember => "NoSuchMember",
            DiagnosticKind::PointerOutsideNative => "PointerOutsideNative",
            DiagnosticKind::PointerArithmeticForbidden => "PointerArithmeticForbidden",
            DiagnosticKind::AsValOnNonPointer => "AsValOnNonPointer",
            DiagnosticKind::AsRefNonPrimitive => "AsRefNonPrimitive",
            DiagnosticKind::AsRefOnParam => "AsRefOnParam",
            DiagnosticKind::NativeLambdaCapture => "NativeLambdaCapture",
            DiagnosticKind::NativeCallbackNonCompat => "NativeCallbackNonCompat",
            DiagnosticKind::PrivateEscape => "PrivateEscape",
            DiagnosticKind::PointerSliceStep => "PointerSliceStep",
            DiagnosticKind::EmptyInitializerNoType => "EmptyInitializerNoType",
            DiagnosticKind::AllocationExhausted => "AllocationExhausted",
        }
    }
}

/// A single recorded diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub message: String,
    pub category: DiagnosticCategory,
    pub kind: DiagnosticKind,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
        };
        write!(f, "{}:{}: {}: {}", self.file, self.line, kind, self.message)?;
        if let Some(s) = &self.suggestion {
            write!(f, " did you mean '{s}'?")?;
        }
        Ok(())
    }
}

/// The diagnostic sink threaded through lexing, parsing, and checking.
///
/// Tracks a phase-local "had error" flag (spec §4.2): each phase of the
/// pipeline can call `had_error()` after running to decide whether to
/// continue (parser) or merely keep collecting (checker, per §7's
/// propagation policy).
pub struct Diagnostics {
    entries: std::cell::RefCell<Vec<Diagnostic>>,
    had_error: Cell<bool>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Diagnostics {
            entries: std::cell::RefCell::new(Vec::new()),
            had_error: Cell::new(false),
        }
    }

    fn push(&self, file: &str, line: u32, kind: DiagnosticKind, category: DiagnosticCategory, message: String, suggestion: Option<String>) {
        if category == DiagnosticCategory::Error {
            self.had_error.set(true);
        }
        self.entries.borrow_mut().push(Diagnostic {
            file: file.to_string(),
            line,
            message,
            category,
            kind,
            suggestion,
        });
    }

    pub fn error_at(&self, file: &str, line: u32, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(file, line, kind, DiagnosticCategory::Error, message.into(), None);
    }

    pub fn error_with_suggestion(&self, file: &str, line: u32, kind: DiagnosticKind, message: impl Into<String>, suggestion: impl Into<String>) {
        self.push(file, line, kind, DiagnosticCategory::Error, message.into(), Some(suggestion.into()));
    }

    pub fn warn_at(&self, file: &str, line: u32, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(file, line, kind, DiagnosticCategory::Warning, message.into(), None);
    }

    #[must_use]
    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    /// Resolve a byte offset to a line number for callers who only have a
    /// `LineMap` and an offset, rather than an already-resolved line.
    pub fn error_at_offset(&self, file: &str, map: &LineMap, offset: u32, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_at(file, map.line_at(offset), kind, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_sets_had_error_but_warning_does_not() {
        let d = Diagnostics::new();
        d.warn_at("a.sn", 1, DiagnosticKind::AsValOnNonPointer, "no-op as val on primitive");
        assert!(!d.had_error());
        d.error_at("a.sn", 2, DiagnosticKind::UndefinedSymbol, "undefined symbol 'x'");
        assert!(d.had_error());
        assert_eq!(d.error_count(), 1);
    }

    #[test]
    fn display_includes_suggestion() {
        let d = Diagnostics::new();
        d.error_with_suggestion("a.sn", 3, DiagnosticKind::UndefinedSymbol, "undefined symbol 'lenght'", "length");
        let entries = d.entries();
        let text = entries[0].to_string();
        assert_eq!(text, "a.sn:3: error: undefined symbol 'lenght' did you mean 'length'?");
    }
}
