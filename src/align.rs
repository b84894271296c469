//! Byte-accurate realignment of engine-reported surfaces onto the original
//! input text, plus conversion of byte offsets into line / UTF-16 positions.

use crate::model::Position;

/// Byte offsets at which each line begins. Line 0 always starts at 0.
pub(crate) fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(index + 1);
        }
    }
    starts
}

/// UTF-16 code-unit length of `text`. Codepoints outside the BMP count as
/// two units, everything else as one.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Converts a byte offset into a 0-based line / UTF-16 column position.
///
/// Out-of-range offsets clamp to the end of the text; offsets that land
/// inside a multi-byte sequence back off to the previous character
/// boundary instead of panicking.
pub(crate) fn position_at(text: &str, starts: &[usize], byte_offset: usize) -> Position {
    let mut offset = byte_offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let line = starts.partition_point(|&start| start <= offset).saturating_sub(1);
    let line_start = starts.get(line).copied().unwrap_or(0);
    Position {
        line: line as u32,
        character: utf16_len(&text[line_start..offset]) as u32,
    }
}

/// Monotonic byte cursor that maps each engine-reported surface back onto
/// the input text.
///
/// A native byte offset reported by the engine is trusted when it lies at
/// or beyond the cursor and the text at that offset byte-matches the
/// surface; otherwise the surface is searched for from the cursor onward.
/// Searching forward means a surface that also occurs earlier in untokenized
/// territory can bind to the wrong occurrence; with an engine that tokenizes
/// the whole input in order this does not arise, and the accepted cost of
/// the heuristic is approximate positions, never a failure.
///
/// A surface that cannot be found at all degrades to the end of the text
/// and pushes the cursor past it, so every later surface degrades the same
/// way and reported offsets stay non-decreasing.
#[derive(Debug)]
pub(crate) struct AlignmentCursor {
    position: usize,
}

impl AlignmentCursor {
    pub(crate) fn new() -> Self {
        Self { position: 0 }
    }

    /// Returns the byte offset where `surface` begins, advancing the cursor
    /// past the match. `text.len()` signals a degraded (not found) match.
    pub(crate) fn locate(
        &mut self,
        text: &str,
        surface: &str,
        native_hint: Option<usize>,
    ) -> usize {
        if surface.is_empty() {
            return self.position.min(text.len());
        }
        if let Some(hint) = native_hint {
            let matches_hint = hint >= self.position
                && text
                    .get(hint..hint + surface.len())
                    .is_some_and(|slice| slice == surface);
            if matches_hint {
                self.position = hint + surface.len();
                return hint;
            }
        }
        let found = text
            .get(self.position..)
            .and_then(|rest| rest.find(surface))
            .map(|relative| self.position + relative);
        match found {
            Some(start) => {
                self.position = start + surface.len();
                start
            }
            None => {
                self.position = text.len() + surface.len();
                text.len()
            }
        }
    }
}

#[cfg(test)]
mod align_tests {
    use super::{line_starts, position_at, utf16_len, AlignmentCursor};

    #[test]
    fn line_starts_follow_newlines() {
        assert_eq!(line_starts(""), vec![0]);
        assert_eq!(line_starts("abc"), vec![0]);
        assert_eq!(line_starts("a\nbc\n"), vec![0, 2, 5]);
        assert_eq!(line_starts("\n\n"), vec![0, 1, 2]);
    }

    #[test]
    fn utf16_len_counts_code_units() {
        assert_eq!(utf16_len(""), 0);
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("誤解"), 2);
        // U+29E3D is outside the BMP: one char, two UTF-16 units.
        assert_eq!(utf16_len("𩸽"), 2);
        assert_eq!(utf16_len("a𩸽b"), 4);
    }

    #[test]
    fn position_at_spans_lines_and_wide_chars() {
        let text = "漢字\nかな";
        let starts = line_starts(text);
        let first = position_at(text, &starts, 0);
        assert_eq!((first.line, first.character), (0, 0));
        let second = position_at(text, &starts, 3);
        assert_eq!((second.line, second.character), (0, 1));
        let next_line = position_at(text, &starts, 7);
        assert_eq!((next_line.line, next_line.character), (1, 0));
        let clamped = position_at(text, &starts, 999);
        assert_eq!((clamped.line, clamped.character), (1, 2));
    }

    #[test]
    fn position_at_backs_off_mid_sequence_offsets() {
        let text = "誤解";
        let starts = line_starts(text);
        let position = position_at(text, &starts, 4);
        assert_eq!((position.line, position.character), (0, 1));
    }

    #[test]
    fn cursor_walks_surfaces_in_order() {
        let text = "私は私です";
        let mut cursor = AlignmentCursor::new();
        assert_eq!(cursor.locate(text, "私", None), 0);
        assert_eq!(cursor.locate(text, "は", None), 3);
        // The second 私 must bind to the later occurrence.
        assert_eq!(cursor.locate(text, "私", None), 6);
        assert_eq!(cursor.locate(text, "です", None), 9);
    }

    #[test]
    fn cursor_skips_whitespace_between_surfaces() {
        let text = "今日は　晴れ";
        let mut cursor = AlignmentCursor::new();
        assert_eq!(cursor.locate(text, "今日", None), 0);
        assert_eq!(cursor.locate(text, "は", None), 6);
        assert_eq!(cursor.locate(text, "晴れ", None), 12);
    }

    #[test]
    fn cursor_accepts_valid_native_hints() {
        let text = "私は私です";
        let mut cursor = AlignmentCursor::new();
        assert_eq!(cursor.locate(text, "私", Some(0)), 0);
        assert_eq!(cursor.locate(text, "は", Some(3)), 3);
        assert_eq!(cursor.locate(text, "私", Some(6)), 6);
    }

    #[test]
    fn cursor_rejects_hints_that_do_not_match() {
        let text = "今日は晴れ";
        let mut cursor = AlignmentCursor::new();
        // Hint points at the wrong bytes, the scan still finds the surface.
        assert_eq!(cursor.locate(text, "晴れ", Some(0)), 9);
        // A hint behind the cursor is stale and must not rewind it.
        let mut cursor = AlignmentCursor::new();
        assert_eq!(cursor.locate(text, "今日", None), 0);
        assert_eq!(cursor.locate(text, "は", Some(0)), 6);
    }

    #[test]
    fn missing_surface_degrades_to_end_of_text() {
        let text = "短い文";
        let mut cursor = AlignmentCursor::new();
        assert_eq!(cursor.locate(text, "存在しない", None), text.len());
        // Later surfaces keep degrading rather than rewinding.
        assert_eq!(cursor.locate(text, "短い", None), text.len());
    }
}
