//! Recursive-descent tree builder
//!
//!     Builds a [DecisionNode] from normalized lines, using indentation alone to find
//!     where a node ends. There are no closing delimiters in the format, so every call
//!     returns the subtree together with the index of the first line it did not consume;
//!     the caller resumes scanning there. That resume index is what lets siblings and
//!     ancestors continue correctly after an arbitrarily deep subtree returns.
//!
//! Algorithm
//!
//!     Starting at a Decision line with indentation `base`:
//!
//!         1. Skip blank and unrecognized lines; they carry no structure.
//!         2. Stop (without consuming) at the first line that is not nested under this
//!            Decision: a Branch indented less than `base`, or any other structural line
//!            indented at or below `base`. Branches at exactly `base` still belong here,
//!            because generators often align `IF` lines with their question.
//!         3. A Branch looks ahead to the next structural line:
//!            - an Outcome becomes a leaf and both lines are consumed
//!            - a Decision is built recursively and scanning resumes where it stopped
//!            - anything else drops the Branch and scanning resumes on the next line
//!         4. Outcome or Decision lines that no Branch owns are skipped.
//!
//!     The builder never backtracks, and every step consumes at least one line, so it
//!     terminates on any finite input. Recursion depth equals tree depth and is bounded
//!     by `max_depth`; past it the parse fails with [ParseError::MalformedInput].

use tracing::{debug, trace};

use crate::mdt::ast::{DecisionNode, Diagnostic, DiagnosticKind, TreeNode};
use crate::mdt::config::DuplicatePolicy;
use crate::mdt::error::ParseError;
use crate::mdt::lexing::{LineClassifier, LineKind, LineToken, NormalizedText};

pub(crate) struct TreeBuilder<'a> {
    text: &'a NormalizedText,
    classifier: &'a LineClassifier,
    max_depth: usize,
    duplicates: DuplicatePolicy,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        text: &'a NormalizedText,
        classifier: &'a LineClassifier,
        max_depth: usize,
        duplicates: DuplicatePolicy,
    ) -> Self {
        TreeBuilder {
            text,
            classifier,
            max_depth: max_depth.max(1),
            duplicates,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn classify(&self, index: usize) -> Option<LineToken> {
        self.text
            .lines
            .get(index)
            .map(|line| self.classifier.classify(line))
    }

    /// First structural (non blank, recognized) line at or after `index`
    pub(crate) fn next_structural(&self, index: usize) -> Option<(usize, LineToken)> {
        (index..self.text.lines.len())
            .filter_map(|idx| self.classify(idx).map(|token| (idx, token)))
            .find(|(_, token)| !token.kind.is_inert())
    }

    /// First Decision line anywhere in the input
    pub(crate) fn find_root(&self) -> Option<(usize, LineToken)> {
        (0..self.text.lines.len())
            .filter_map(|idx| self.classify(idx).map(|token| (idx, token)))
            .find(|(_, token)| token.kind == LineKind::Decision)
    }

    /// Build the whole tree from the first Decision line.
    ///
    /// Lines after the root node ends are ignored, but reported.
    pub(crate) fn build(&mut self) -> Result<Option<TreeNode>, ParseError> {
        let Some((root_idx, root)) = self.find_root() else {
            if !self.text.is_empty() {
                self.report(
                    0,
                    DiagnosticKind::NoDecision,
                    "no decision line found; nothing to build",
                );
            }
            return Ok(None);
        };

        let (node, next) = self.build_node(root_idx, root, 1)?;

        if let Some((idx, token)) = self.next_structural(next) {
            self.report(
                idx,
                DiagnosticKind::TrailingContent,
                format!("ignoring {} line and everything after the root decision", token.kind),
            );
        }

        Ok(Some(node))
    }

    /// Build the node headed by the Decision `head` found at `start`.
    ///
    /// Returns the node and the index of the first line not consumed by it.
    pub(crate) fn build_node(
        &mut self,
        start: usize,
        head: LineToken,
        depth: usize,
    ) -> Result<(TreeNode, usize), ParseError> {
        debug_assert_eq!(head.kind, LineKind::Decision);

        if depth > self.max_depth {
            return Err(ParseError::MalformedInput {
                line: self.text.line_number(start),
                depth,
                limit: self.max_depth,
            });
        }

        let base = head.indent;
        let mut node = DecisionNode::new(head.text);
        let mut cursor = start + 1;

        trace!(line = self.text.line_number(start), base, depth, "decision");

        while let Some((idx, token)) = self.next_structural(cursor) {
            let nested = match token.kind {
                LineKind::Branch => token.indent >= base,
                _ => token.indent > base,
            };
            if !nested {
                return Ok((node.into(), idx));
            }

            match token.kind {
                LineKind::Branch => {
                    cursor = self.build_branch(&mut node, idx, token, depth)?;
                }
                LineKind::Outcome | LineKind::Decision => {
                    self.report(
                        idx,
                        DiagnosticKind::StrayLine,
                        format!("{} line is not preceded by a branch", token.kind),
                    );
                    cursor = idx + 1;
                }
                LineKind::Blank | LineKind::Unrecognized => cursor = idx + 1,
            }
        }

        Ok((node.into(), self.text.lines.len()))
    }

    /// Resolve the child of the Branch at `idx` and attach it to `node`.
    ///
    /// Returns the cursor to resume scanning from.
    fn build_branch(
        &mut self,
        node: &mut DecisionNode,
        idx: usize,
        branch: LineToken,
        depth: usize,
    ) -> Result<usize, ParseError> {
        let condition = branch.text;

        match self.next_structural(idx + 1) {
            Some((child_idx, child)) if child.kind == LineKind::Outcome => {
                self.attach(node, idx, condition, TreeNode::Outcome(child.text));
                Ok(child_idx + 1)
            }
            Some((child_idx, child)) if child.kind == LineKind::Decision => {
                let (subtree, next) = self.build_node(child_idx, child, depth + 1)?;
                self.attach(node, idx, condition, subtree);
                Ok(next)
            }
            other => {
                let found = other.map_or("end of input".to_string(), |(_, token)| {
                    format!("{} line", token.kind)
                });
                debug!(
                    line = self.text.line_number(idx),
                    condition = condition.as_str(),
                    "dropping branch without child"
                );
                self.report(
                    idx,
                    DiagnosticKind::DroppedBranch,
                    format!("branch '{condition}' is followed by {found}, not an outcome or decision"),
                );
                Ok(idx + 1)
            }
        }
    }

    fn attach(&mut self, node: &mut DecisionNode, idx: usize, condition: String, child: TreeNode) {
        let label = condition.clone();
        if node.insert(condition, child, self.duplicates) {
            let kept = match self.duplicates {
                DuplicatePolicy::LastWins => "keeping the later branch",
                DuplicatePolicy::FirstWins => "keeping the earlier branch",
            };
            debug!(
                line = self.text.line_number(idx),
                condition = label.as_str(),
                "duplicate condition"
            );
            self.report(
                idx,
                DiagnosticKind::DuplicateCondition,
                format!("condition '{label}' repeats under '{}'; {kept}", node.question()),
            );
        }
    }

    fn report(&mut self, idx: usize, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(self.text.line_number(idx), kind, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdt::lexing::normalize_with;

    fn build(source: &str, max_depth: usize) -> (Result<Option<TreeNode>, ParseError>, Vec<Diagnostic>) {
        let text = normalize_with(source, 4);
        let classifier = LineClassifier::default();
        let mut builder = TreeBuilder::new(&text, &classifier, max_depth, DuplicatePolicy::LastWins);
        let tree = builder.build();
        (tree, builder.into_diagnostics())
    }

    #[test]
    fn test_resume_index_after_nested_subtree() {
        let source = "DECISION POINT: A\n  IF 'x':\n    DECISION POINT: B\n      IF 'y':\n        OUTCOME: b\nDECISION POINT: C";
        let text = normalize_with(source, 4);
        let classifier = LineClassifier::default();
        let mut builder = TreeBuilder::new(&text, &classifier, 16, DuplicatePolicy::LastWins);

        let (_, head) = builder.find_root().unwrap();
        let (_, next) = builder.build_node(0, head, 1).unwrap();
        assert_eq!(next, 5);

        let (_, inner_head) = builder.next_structural(2).unwrap();
        let (_, inner_next) = builder.build_node(2, inner_head, 2).unwrap();
        assert_eq!(inner_next, 5);
    }

    #[test]
    fn test_consumes_to_end_of_input() {
        let source = "DECISION POINT: A\n  IF 'x':\n    OUTCOME: a\n\n  trailing note";
        let text = normalize_with(source, 4);
        let classifier = LineClassifier::default();
        let mut builder = TreeBuilder::new(&text, &classifier, 16, DuplicatePolicy::LastWins);
        let (_, head) = builder.find_root().unwrap();
        let (_, next) = builder.build_node(0, head, 1).unwrap();
        assert_eq!(next, text.lines.len());
    }

    #[test]
    fn test_depth_limit_fails_closed() {
        let source = "DECISION POINT: A\n  IF 'x':\n    DECISION POINT: B\n      IF 'y':\n        DECISION POINT: C\n          IF 'z':\n            OUTCOME: c";
        let (tree, _) = build(source, 2);
        assert_eq!(
            tree,
            Err(ParseError::MalformedInput {
                line: 5,
                depth: 3,
                limit: 2
            })
        );

        let (tree, _) = build(source, 3);
        assert_eq!(tree.unwrap().unwrap().depth(), 4);
    }

    #[test]
    fn test_reports_dropped_branch_with_line_number() {
        let (tree, diagnostics) = build("\nDECISION POINT: A\n  IF 'x':\n  IF 'y':\n    OUTCOME: y", 16);
        let root = tree.unwrap().unwrap();
        assert_eq!(root.as_decision().unwrap().conditions().collect::<Vec<_>>(), vec!["y"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DroppedBranch);
        assert_eq!(diagnostics[0].line, 3);
    }

    #[test]
    fn test_reports_missing_root_only_for_non_empty_input() {
        let (tree, diagnostics) = build("", 16);
        assert_eq!(tree, Ok(None));
        assert!(diagnostics.is_empty());

        let (tree, diagnostics) = build("I could not find a decision tree.", 16);
        assert_eq!(tree, Ok(None));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::NoDecision);
    }
}
