//! Helpers at the boundary with the extraction pipeline
//!
//! Long articles are split into paragraph chunks, each chunk is sent to the
//! generator, outputs without any tree markers are discarded, and the surviving
//! partial trees are joined with a `---` separator for a synthesis pass. None of
//! that is parsing, but the pieces that touch transcript text live here so the
//! separator and the marker check stay consistent with the parser.

use crate::mdt::lexing::LineClassifier;

/// Separator placed between partial trees
pub const PARTIAL_SEPARATOR: &str = "\n---\n";

/// Split `text` into paragraphs on blank lines, trimmed, empty ones removed.
pub fn chunk_text(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                chunks.push(text[s..end].trim());
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        chunks.push(text[s..end].trim());
    }

    chunks
}

/// Whether generator output mentions a Decision or Outcome marker.
///
/// A cheap filter: outputs that fail it cannot produce a tree.
pub fn has_tree_markers(text: &str, classifier: &LineClassifier) -> bool {
    classifier.mentions_markers(text)
}

/// Join partial trees for a synthesis pass.
pub fn join_partials<S: AsRef<str>>(partials: &[S]) -> String {
    partials
        .iter()
        .map(|partial| partial.as_ref())
        .collect::<Vec<_>>()
        .join(PARTIAL_SEPARATOR)
}

/// Split joined partial trees back apart on lines holding only `---`.
///
/// Empty partials are dropped.
pub fn split_partials(text: &str) -> Vec<&str> {
    split_partials_with_lines(text)
        .into_iter()
        .map(|(_, partial)| partial)
        .collect()
}

/// Like [split_partials], pairing each partial with the 1-based line of `text`
/// it starts on.
pub fn split_partials_with_lines(text: &str) -> Vec<(usize, &str)> {
    let mut partials = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut offset = 0;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if line.trim() == "---" {
            partials.push((start_line, &text[start..offset]));
            start = offset + line.len();
            start_line = idx + 2;
        }
        offset += line.len();
    }
    partials.push((start_line, &text[start..]));

    partials
        .into_iter()
        .filter(|(_, partial)| !partial.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_splits_on_blank_lines() {
        let text = "  First paragraph\ncontinues here.\n\n\n Second.\n   \nThird\n";
        assert_eq!(
            chunk_text(text),
            vec!["First paragraph\ncontinues here.", "Second.", "Third"]
        );
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("").is_empty());
        assert!(chunk_text("\n \n").is_empty());
    }

    #[test]
    fn test_has_tree_markers() {
        let classifier = LineClassifier::default();
        assert!(has_tree_markers("DECISION POINT: Q?", &classifier));
        assert!(has_tree_markers("blah\n  OUTCOME: rest", &classifier));
        assert!(!has_tree_markers("No decision tree here.", &classifier));
    }

    #[test]
    fn test_join_and_split_partials() {
        let partials = vec![
            "DECISION POINT: A\n  IF 'x':\n    OUTCOME: a".to_string(),
            "DECISION POINT: B\n  IF 'y':\n    OUTCOME: b".to_string(),
        ];
        let joined = join_partials(&partials);
        assert_eq!(
            joined,
            "DECISION POINT: A\n  IF 'x':\n    OUTCOME: a\n---\nDECISION POINT: B\n  IF 'y':\n    OUTCOME: b"
        );
        let split: Vec<String> = split_partials(&joined)
            .into_iter()
            .map(|p| p.trim_end().to_string())
            .collect();
        assert_eq!(split, partials);
    }

    #[test]
    fn test_split_partials_tracks_starting_lines() {
        let text = "A\nA2\n---\nB\n---\n\n---\nC";
        assert_eq!(
            split_partials_with_lines(text),
            vec![(1, "A\nA2\n"), (4, "B\n"), (8, "C")]
        );
    }

    #[test]
    fn test_split_partials_drops_empty_sections() {
        assert_eq!(split_partials("---\nA\n---\n\n---\nB"), vec!["A\n", "B"]);
        assert_eq!(split_partials("no separator"), vec!["no separator"]);
    }
}
