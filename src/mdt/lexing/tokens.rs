//! Line token types
//!
//! A [LineToken] is what the classifier makes of one normalized line. Tokens are
//! short lived: the builder inspects them and keeps only the payload text.

use std::fmt;

/// The classification of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineKind {
    /// Question line: `DECISION POINT: <question>`
    Decision,

    /// Condition line: `IF '<label>':`
    Branch,

    /// Leaf line: `OUTCOME: <text>`
    Outcome,

    /// Empty or whitespace only
    Blank,

    /// Anything else, including marker lines with a malformed payload
    Unrecognized,
}

impl LineKind {
    /// Blank and unrecognized lines carry no structure and are skipped by the builder.
    pub fn is_inert(self) -> bool {
        matches!(self, LineKind::Blank | LineKind::Unrecognized)
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Decision => "DECISION",
            LineKind::Branch => "BRANCH",
            LineKind::Outcome => "OUTCOME",
            LineKind::Blank => "BLANK",
            LineKind::Unrecognized => "UNRECOGNIZED",
        };
        write!(f, "{}", name)
    }
}

/// One classified line.
///
/// `text` is the payload: the question, the condition label or the outcome.
/// For blank and unrecognized lines it is the trimmed line content.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LineToken {
    pub kind: LineKind,
    pub indent: usize,
    pub text: String,
}

impl LineToken {
    pub fn new(kind: LineKind, indent: usize, text: impl Into<String>) -> Self {
        LineToken {
            kind,
            indent,
            text: text.into(),
        }
    }
}

impl fmt::Display for LineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} indent={}> {}", self.kind, self.indent, self.text)
    }
}
