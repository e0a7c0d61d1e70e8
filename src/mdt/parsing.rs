//! Parsing: from transcript text to a decision tree
//!
//!     The pipeline is normalize, then build. Classification happens inside the builder,
//!     one line at a time, as it consumes lines. See [builder] for the algorithm.
//!
//!     Parsing is deliberately lenient. Text without any decision line parses to `None`,
//!     unparsable branches are dropped, and stray lines are skipped. The single hard
//!     failure is nesting beyond the configured depth. Use [TreeParser::parse_with_diagnostics]
//!     to see what was skipped.
//!
//!     A [TreeParser] owns only immutable data (compiled matchers and limits), so one
//!     instance can be shared across threads and used for any number of concurrent parses.

pub mod builder;

use once_cell::sync::Lazy;
use tracing::instrument;

use crate::mdt::ast::{Diagnostic, TreeNode};
use crate::mdt::config::{DuplicatePolicy, MdtConfig};
use crate::mdt::error::{MarkerError, ParseError};
use crate::mdt::lexing::normalization::{normalize_with, DEFAULT_TAB_WIDTH};
use crate::mdt::lexing::{lex, LineClassifier, LineToken};
use builder::TreeBuilder;

/// Deepest nesting any parser accepts.
///
/// A decision occupies two levels of the JSON and YAML shape (the node and its
/// branch map) and both codecs refuse input nested 128 levels deep, so a deeper
/// tree could be written out but never loaded back.
pub const MAX_DEPTH_LIMIT: usize = 60;

/// Nesting limit used when no configuration is given
pub const DEFAULT_MAX_DEPTH: usize = MAX_DEPTH_LIMIT;

static DEFAULT_PARSER: Lazy<TreeParser> = Lazy::new(TreeParser::new);

/// Parse `source` with the built-in markers and limits.
///
/// Returns `Ok(None)` when the text holds no decision line.
pub fn parse(source: &str) -> Result<Option<TreeNode>, ParseError> {
    DEFAULT_PARSER.parse(source)
}

/// Like [parse], also returning what was skipped or overridden.
pub fn parse_with_diagnostics(source: &str) -> Result<ParseReport, ParseError> {
    DEFAULT_PARSER.parse_with_diagnostics(source)
}

/// The tree (if any) and the diagnostics collected while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub tree: Option<TreeNode>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Configured parser
#[derive(Debug, Clone)]
pub struct TreeParser {
    classifier: LineClassifier,
    tab_width: usize,
    max_depth: usize,
    duplicates: DuplicatePolicy,
}

impl TreeParser {
    /// Parser with the built-in markers and limits.
    pub fn new() -> Self {
        TreeParser {
            classifier: LineClassifier::default(),
            tab_width: DEFAULT_TAB_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            duplicates: DuplicatePolicy::LastWins,
        }
    }

    /// Parser for a loaded configuration. Fails only on unusable markers.
    pub fn from_config(config: &MdtConfig) -> Result<Self, MarkerError> {
        Ok(TreeParser {
            classifier: LineClassifier::new(&config.markers)?,
            tab_width: config.lexing.tab_width,
            max_depth: clamp_depth(config.parsing.max_depth),
            duplicates: config.parsing.duplicate_conditions,
        })
    }

    /// Lower the nesting limit. Values above [MAX_DEPTH_LIMIT] are capped.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = clamp_depth(max_depth);
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Lines of `source` as this parser classifies them, with source line numbers.
    pub fn tokens(&self, source: &str) -> Vec<(usize, LineToken)> {
        lex(source, self.tab_width, &self.classifier)
    }

    pub fn parse(&self, source: &str) -> Result<Option<TreeNode>, ParseError> {
        self.parse_with_diagnostics(source).map(|report| report.tree)
    }

    #[instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn parse_with_diagnostics(&self, source: &str) -> Result<ParseReport, ParseError> {
        let text = normalize_with(source, self.tab_width);
        let mut builder = TreeBuilder::new(&text, &self.classifier, self.max_depth, self.duplicates);
        let tree = builder.build()?;
        let diagnostics = builder.into_diagnostics();

        tracing::debug!(
            lines = text.lines.len(),
            found = tree.is_some(),
            diagnostics = diagnostics.len(),
            "parsed"
        );

        Ok(ParseReport { tree, diagnostics })
    }
}

fn clamp_depth(max_depth: usize) -> usize {
    if max_depth > MAX_DEPTH_LIMIT {
        tracing::warn!(
            requested = max_depth,
            limit = MAX_DEPTH_LIMIT,
            "max_depth capped so stored trees stay loadable"
        );
    }
    max_depth.min(MAX_DEPTH_LIMIT)
}

impl Default for TreeParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdt::ast::{DecisionNode, DiagnosticKind};
    use crate::mdt::config::{load_defaults, Loader};

    fn valproic() -> TreeNode {
        DecisionNode::new("Is valproic acid applicable?")
            .with_branch("Yes", "Prescribe valproic acid.")
            .with_branch("No", "Refer to neurologist.")
            .into()
    }

    #[test]
    fn test_two_branch_decision() {
        let source = "DECISION POINT: Is valproic acid applicable?\n  IF 'Yes':\n    OUTCOME: Prescribe valproic acid.\n  IF 'No':\n    OUTCOME: Refer to neurologist.";
        assert_eq!(parse(source).unwrap(), Some(valproic()));
    }

    #[test]
    fn test_empty_input_is_absent_tree() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("\n\n   \n").unwrap(), None);
    }

    #[test]
    fn test_outcome_without_branch_is_ignored() {
        let source = "DECISION POINT: Q?\n  OUTCOME: Orphan.";
        assert_eq!(
            parse(source).unwrap(),
            Some(DecisionNode::new("Q?").into())
        );
    }

    #[test]
    fn test_duplicate_label_last_wins() {
        let source = "DECISION POINT: Q?\n  IF 'Yes':\n    OUTCOME: first\n  IF 'Yes':\n    OUTCOME: second";
        let report = parse_with_diagnostics(source).unwrap();
        let root = report.tree.unwrap();
        let node = root.as_decision().unwrap();
        assert_eq!(node.len(), 1);
        assert_eq!(node.get("Yes"), Some(&TreeNode::outcome("second")));
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::DuplicateCondition);
        assert_eq!(report.diagnostics[0].line, 4);
    }

    #[test]
    fn test_duplicate_label_first_wins() {
        let source = "DECISION POINT: Q?\n  IF 'Yes':\n    OUTCOME: first\n  IF 'Yes':\n    OUTCOME: second";
        let parser = TreeParser::new().with_duplicate_policy(DuplicatePolicy::FirstWins);
        let root = parser.parse(source).unwrap().unwrap();
        assert_eq!(
            root.as_decision().unwrap().get("Yes"),
            Some(&TreeNode::outcome("first"))
        );
    }

    #[test]
    fn test_default_parser_matches_default_config() {
        let config = load_defaults().unwrap();
        let parser = TreeParser::from_config(&config).unwrap();
        let defaults = TreeParser::default();
        assert_eq!(parser.max_depth, defaults.max_depth);
        assert_eq!(parser.tab_width, defaults.tab_width);
        assert_eq!(parser.duplicates, defaults.duplicates);
        assert_eq!(parser.classifier.markers(), defaults.classifier.markers());
    }

    #[test]
    fn test_from_config_uses_configured_markers() {
        let config = Loader::new()
            .set_override("markers.decision", "QUESTION:")
            .unwrap()
            .build()
            .unwrap();
        let parser = TreeParser::from_config(&config).unwrap();
        let tree = parser
            .parse("QUESTION: Fever?\n  IF 'Yes':\n    OUTCOME: Antipyretics.")
            .unwrap()
            .unwrap();
        assert_eq!(tree.as_decision().unwrap().question(), "Fever?");

        let tokens = parser.tokens("\nQUESTION: Fever?\nDECISION POINT: Cough?");
        assert_eq!(tokens[0].0, 2);
        assert_eq!(tokens[0].1.to_string(), "<DECISION indent=0> Fever?");
        assert_eq!(tokens[1].1.kind, crate::mdt::lexing::LineKind::Unrecognized);
    }

    #[test]
    fn test_tab_width_controls_depth() {
        let source = "DECISION POINT: Q?\n\tIF 'Yes':\n\t\tOUTCOME: ok";
        let tree = TreeParser::new().with_tab_width(8).parse(source).unwrap().unwrap();
        assert_eq!(tree.outcomes(), vec!["ok"]);
    }

    #[test]
    fn test_em_space_indentation_keeps_nesting() {
        let em = "\u{2003}".repeat(6);
        let source = format!(
            "DECISION POINT: A\n  IF 'x':\n    DECISION POINT: B\n{em}IF 'y':\n        OUTCOME: y"
        );
        let expected: TreeNode = DecisionNode::new("A")
            .with_branch("x", DecisionNode::new("B").with_branch("y", "y"))
            .into();
        assert_eq!(parse(&source).unwrap(), Some(expected));
    }

    #[test]
    fn test_max_depth_is_capped_at_storable_limit() {
        assert_eq!(TreeParser::new().with_max_depth(500).max_depth(), MAX_DEPTH_LIMIT);
        assert_eq!(TreeParser::new().with_max_depth(5).max_depth(), 5);

        let config = Loader::new()
            .set_override("parsing.max_depth", 1000_i64)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(TreeParser::from_config(&config).unwrap().max_depth(), MAX_DEPTH_LIMIT);
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreeParser>();

        let parser = TreeParser::new();
        let source = "DECISION POINT: Q?\n  IF 'Yes':\n    OUTCOME: ok";
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| parser.parse(source).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap().outcomes(), vec!["ok"]);
            }
        });
    }
}
