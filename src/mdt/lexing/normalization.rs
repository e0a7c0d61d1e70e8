//! Line normalization
//!
//!     Transcripts arrive from language models or are pasted out of rich text editors,
//!     so their whitespace is unreliable. Indentation is the only structure the format
//!     has, which makes that a correctness problem rather than a cosmetic one.
//!
//!     Normalization does, per line:
//!
//!         - replace non-breaking spaces (U+00A0, U+2007, U+202F) with plain spaces,
//!           and any other whitespace in the indentation (em spaces, ideographic
//!           spaces) with one plain space each
//!         - expand tabs to the next tab stop (default every 4 columns), so mixed tab
//!           and space indentation yields comparable depths
//!         - drop trailing carriage returns
//!
//!     and for the whole text it drops a leading byte order mark and the leading and
//!     trailing blank lines. Nothing else is touched: interior blank lines and the
//!     indentation of the first content line survive.
//!
//!     Normalizing normalized text is a no-op.

/// Tab stop distance used when no configuration is given.
pub const DEFAULT_TAB_WIDTH: usize = 4;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Normalized lines plus enough bookkeeping to report source line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText {
    pub lines: Vec<String>,
    /// 1-based source line number of `lines[0]`
    pub first_line: usize,
}

impl NormalizedText {
    /// 1-based source line number for a normalized line index.
    pub fn line_number(&self, index: usize) -> usize {
        self.first_line + index
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Normalize `source` with the default tab width.
pub fn normalize(source: &str) -> Vec<String> {
    normalize_with(source, DEFAULT_TAB_WIDTH).lines
}

/// Normalize `source`, expanding tabs to multiples of `tab_width` columns.
///
/// A `tab_width` of zero is treated as one.
pub fn normalize_with(source: &str, tab_width: usize) -> NormalizedText {
    let tab_width = tab_width.max(1);
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);

    let lines: Vec<String> = source
        .lines()
        .map(|line| normalize_line(line, tab_width))
        .collect();

    let Some(start) = lines.iter().position(|line| !is_blank(line)) else {
        return NormalizedText {
            lines: Vec::new(),
            first_line: 1,
        };
    };
    // A non-blank line exists, so rposition finds one at or after `start`.
    let end = lines
        .iter()
        .rposition(|line| !is_blank(line))
        .map_or(start + 1, |idx| idx + 1);

    NormalizedText {
        lines: lines[start..end].to_vec(),
        first_line: start + 1,
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn normalize_line(line: &str, tab_width: usize) -> String {
    let line = line.trim_end_matches('\r');
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    let mut in_indent = true;

    for ch in line.chars() {
        match ch {
            '\t' => {
                let stop = (column / tab_width + 1) * tab_width;
                out.extend(std::iter::repeat(' ').take(stop - column));
                column = stop;
            }
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => {
                out.push(' ');
                column += 1;
            }
            // Any other whitespace in the indentation is one column.
            c if in_indent && c.is_whitespace() => {
                out.push(' ');
                column += 1;
            }
            _ => {
                in_indent = false;
                out.push(ch);
                column += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(normalize("").is_empty());
        assert!(normalize("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_strips_outer_blank_lines_only() {
        let lines = normalize("\n\n  a\n\n  b\n   \n");
        assert_eq!(lines, vec!["  a", "", "  b"]);
    }

    #[test]
    fn test_tracks_first_line_number() {
        let text = normalize_with("\n\nDECISION POINT: Q?\n", DEFAULT_TAB_WIDTH);
        assert_eq!(text.first_line, 3);
        assert_eq!(text.line_number(0), 3);
    }

    #[test]
    fn test_non_breaking_spaces_become_spaces() {
        let lines = normalize("\u{00A0}\u{00A0}IF 'Yes':");
        assert_eq!(lines, vec!["  IF 'Yes':"]);
    }

    #[test]
    fn test_unicode_indentation_becomes_spaces() {
        let lines = normalize("\u{2003}\u{2003}\u{3000}IF 'y':\u{2003}");
        assert_eq!(lines, vec!["   IF 'y':\u{2003}"]);
    }

    #[test]
    fn test_tabs_expand_to_tab_stops() {
        assert_eq!(normalize("\tx"), vec!["    x"]);
        assert_eq!(normalize("  \tx"), vec!["    x"]);
        assert_eq!(normalize("\t\tx"), vec!["        x"]);
        assert_eq!(normalize_with("\tx", 2).lines, vec!["  x"]);
    }

    #[test]
    fn test_zero_tab_width_is_clamped() {
        assert_eq!(normalize_with("\tx", 0).lines, vec![" x"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        let lines = normalize("\u{FEFF}a\r\n  b\r\n");
        assert_eq!(lines, vec!["a", "  b"]);
    }

    #[test]
    fn test_idempotent() {
        let source = "\n\t DECISION POINT: Q?\r\n\u{00A0}\tIF 'Yes':\n\n        OUTCOME: ok\n\n";
        let once = normalize(source);
        let twice = normalize(&once.join("\n"));
        assert_eq!(once, twice);
    }
}
