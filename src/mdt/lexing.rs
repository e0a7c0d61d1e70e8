//! Lexing: from raw transcript text to classified lines
//!
//!     The transcript format is line oriented, so lexing is two pure passes:
//!
//!         1. [normalization] canonicalizes whitespace and splits the text into lines.
//!         2. [line_classification] turns one line into a [LineToken] carrying its kind,
//!            indentation and payload.
//!
//!     Neither pass keeps state between lines. The tree builder classifies lines on
//!     demand as it walks them, so nothing here allocates per document beyond the
//!     line vector itself.

pub mod line_classification;
pub mod normalization;
pub mod tokens;

pub use line_classification::{classify, LineClassifier};
pub use normalization::{normalize, normalize_with, NormalizedText};
pub use tokens::{LineKind, LineToken};

/// Normalize and classify every line, pairing each token with its 1-based source line.
///
/// Used by `mdt tokens`; the parser itself classifies lazily.
pub fn lex(
    source: &str,
    tab_width: usize,
    classifier: &LineClassifier,
) -> Vec<(usize, LineToken)> {
    let text = normalize_with(source, tab_width);
    text.lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (text.line_number(idx), classifier.classify(line)))
        .collect()
}
