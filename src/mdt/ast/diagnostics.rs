//! Parse diagnostics
//!
//! The builder never fails on odd lines; it skips them. Diagnostics record what was
//! skipped or overridden so callers that care (the CLI's `--diagnostics` flag, a
//! pipeline deciding whether to re-prompt the generator) can see it, while callers
//! that only want the tree can ignore them.

use serde::Serialize;
use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Information,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Information => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Branch whose next structural line is neither an outcome nor a decision
    DroppedBranch,
    /// Condition label repeated under one decision
    DuplicateCondition,
    /// Outcome or decision line not owned by a branch
    StrayLine,
    /// Non-empty input without any decision line
    NoDecision,
    /// Structural lines after the root node ended
    TrailingContent,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::DroppedBranch => "dropped-branch",
            DiagnosticKind::DuplicateCondition => "duplicate-condition",
            DiagnosticKind::StrayLine => "stray-line",
            DiagnosticKind::NoDecision => "no-decision",
            DiagnosticKind::TrailingContent => "trailing-content",
        }
    }

    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticKind::DroppedBranch
            | DiagnosticKind::DuplicateCondition
            | DiagnosticKind::NoDecision => DiagnosticSeverity::Warning,
            DiagnosticKind::StrayLine | DiagnosticKind::TrailingContent => {
                DiagnosticSeverity::Information
            }
        }
    }
}

/// One anomaly found while building a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line in the original input
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            kind,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.kind.severity()
    }

    /// Move the reported line down by `lines`, for text embedded in a larger input.
    pub fn offset_lines(mut self, lines: usize) -> Self {
        self.line += lines;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}[{}]: {}",
            self.line,
            self.severity(),
            self.kind.code(),
            self.message
        )
    }
}
