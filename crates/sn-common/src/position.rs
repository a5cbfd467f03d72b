//! Line/column conversion for human-readable diagnostics.
//!
//! Tokens and AST nodes only carry a line number (spec §3.1); this module
//! supplies the `LineMap` used to derive that line number from a byte
//! offset while lexing, and to format `file:line:` diagnostic prefixes.

/// Maps byte offsets to 1-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line; `line_starts[0]` is always 0.
    line_starts: Vec<u32>,
}

/// A 1-indexed line number paired with the file it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
}

impl LineMap {
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset into a 1-indexed line number.
    #[must_use]
    pub fn line_at(&self, offset: u32) -> u32 {
        let line0 = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        u32::try_from(line0).unwrap_or(u32::MAX) + 1
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_one() {
        let m = LineMap::build("abc\ndef\nghi");
        assert_eq!(m.line_at(0), 1);
        assert_eq!(m.line_at(2), 1);
    }

    #[test]
    fn offsets_after_newlines_advance_the_line() {
        let m = LineMap::build("abc\ndef\nghi");
        assert_eq!(m.line_at(4), 2);
        assert_eq!(m.line_at(8), 3);
    }
}
