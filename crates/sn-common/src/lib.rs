//! Shared foundation for the Sindarin front end.
//!
//! - `arena` — the bump allocator that owns every token, type, AST node, and
//!   symbol produced during one compilation (spec §4.1 / §3.8).
//! - `span` / `position` — source location tracking.
//! - `diagnostics` — the error/warning sink (spec §4.2).
//! - `options` — compiler-wide configuration threaded into every phase.
//! - `limits` — thresholds used by the suggestion engine and recursive
//!   traversals to keep pathological inputs bounded.

pub mod arena;
pub mod diagnostics;
pub mod limits;
pub mod options;
pub mod position;
pub mod span;

pub use arena::{Arena, ArenaError};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticKind, Diagnostics};
pub use options::CompilerOptions;
pub use position::{LineMap, Position};
pub use span::Span;
