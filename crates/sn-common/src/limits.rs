//! Centralized thresholds — a single place to look up "why this number"
//! instead of a magic constant buried in the call site.

/// Maximum Levenshtein distance accepted by the spelling-suggestion engine
/// (spec §4.2 / §9 "Suggestion engine").
pub const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Candidates whose length differs from the misspelled name by more than
/// this are skipped before running Levenshtein at all, bounding the
/// O(N*M*L) blow-up of comparing every candidate against every misspelling.
pub const SUGGESTION_LENGTH_SLACK: usize = 2;

/// Recursion guard for structural type-equality checks over deeply nested
/// array/function types, so a malformed or adversarial type expression
/// cannot blow the stack during `type_equals`.
pub const MAX_TYPE_RECURSION_DEPTH: usize = 256;

/// Upper bound on arena-context nesting (`private` blocks and non-shared
/// loops) the checker will track before treating further nesting as a
/// resource-exhaustion diagnostic rather than recursing further.
pub const MAX_ARENA_CONTEXT_DEPTH: usize = 512;
