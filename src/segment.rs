//! Sentence-boundary segmentation.
//!
//! Per-sentence consumers (grammar checking, dependency parsing) want the
//! input split at Japanese sentence terminators; spans are byte offsets
//! into the unmodified input so they compose with token positions.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::SentenceBoundary;

/// A run of terminator punctuation plus any closing brackets riding on
/// it, or a bare newline.
fn terminator_regex() -> &'static Regex {
    static TERMINATOR: OnceLock<Regex> = OnceLock::new();
    TERMINATOR.get_or_init(|| {
        Regex::new(r#"[。．！？!?…]+[」』）)”"]*|\n"#).expect("sentence terminator pattern is valid")
    })
}

/// Splits text into sentence byte spans.
///
/// A sentence ends after its terminator run; a newline also ends a
/// sentence but is not part of it. Surrounding whitespace is trimmed from
/// each span, whitespace-only spans are dropped, and trailing text with
/// no terminator forms a final sentence.
pub fn split_into_sentences(text: &str) -> Vec<SentenceBoundary> {
    let mut boundaries = Vec::new();
    let mut cursor = 0usize;
    for matched in terminator_regex().find_iter(text) {
        let end = if matched.as_str() == "\n" {
            matched.start()
        } else {
            matched.end()
        };
        push_span(text, cursor, end, &mut boundaries);
        cursor = matched.end();
    }
    push_span(text, cursor, text.len(), &mut boundaries);
    boundaries
}

fn push_span(text: &str, begin: usize, end: usize, boundaries: &mut Vec<SentenceBoundary>) {
    let span = match text.get(begin..end) {
        Some(span) => span,
        None => return,
    };
    let leading = span.len() - span.trim_start().len();
    let trailing = span.len() - span.trim_end().len();
    let begin = begin + leading;
    let end = end - trailing;
    if begin >= end {
        return;
    }
    boundaries.push(SentenceBoundary { begin, end });
}
