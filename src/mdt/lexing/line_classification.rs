//! Line Classification
//!
//! Core classification logic for determining line kinds from a single normalized line.
//!
//! Classification follows this order:
//! 1. Blank lines (empty or whitespace only)
//! 2. Decision lines: `<indent>DECISION POINT: <question>`
//! 3. Branch lines: `<indent>[- ]IF '<label>':` and nothing else
//! 4. Outcome lines: `<indent>OUTCOME: <text>`
//! 5. Everything else is unrecognized, including marker lines whose payload is empty
//!
//! Matchers are compiled once per [LineClassifier]. The default classifier is built
//! lazily on first use and shared read-only between threads afterwards.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mdt::config::Markers;
use crate::mdt::error::MarkerError;
use crate::mdt::lexing::tokens::{LineKind, LineToken};

/// Classifier for the built-in markers
static DEFAULT_CLASSIFIER: Lazy<LineClassifier> =
    Lazy::new(|| LineClassifier::new(&Markers::default()).unwrap());

/// Classify one line with the built-in markers.
pub fn classify(line: &str) -> LineToken {
    DEFAULT_CLASSIFIER.classify(line)
}

/// Precompiled line matchers for one set of markers.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    markers: Markers,
    decision: Regex,
    branch: Regex,
    outcome: Regex,
}

impl LineClassifier {
    /// Compile matchers for `markers`. Markers are matched literally.
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        let decision = marker_pattern("decision", &markers.decision)?;
        let branch = marker_pattern("branch", &markers.branch)?;
        let outcome = marker_pattern("outcome", &markers.outcome)?;

        Ok(LineClassifier {
            markers: markers.clone(),
            decision: Regex::new(&format!(r"^\s*{decision}(?P<text>.*)$"))?,
            // Label runs from the first to the last quote, so apostrophes inside survive.
            branch: Regex::new(&format!(
                r"^\s*(?:[-*]\s+)?{branch}\s*['‘](?P<label>.*)['’]\s*:\s*$"
            ))?,
            outcome: Regex::new(&format!(r"^\s*{outcome}(?P<text>.*)$"))?,
        })
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Classify one normalized line. Pure: no state, no lookahead.
    pub fn classify(&self, line: &str) -> LineToken {
        let indent = leading_spaces(line);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return LineToken::new(LineKind::Blank, indent, "");
        }

        if let Some(text) = capture_payload(&self.decision, line, "text") {
            return LineToken::new(LineKind::Decision, indent, text);
        }

        if let Some(label) = capture_payload(&self.branch, line, "label") {
            return LineToken::new(LineKind::Branch, indent, label);
        }

        if let Some(text) = capture_payload(&self.outcome, line, "text") {
            return LineToken::new(LineKind::Outcome, indent, text);
        }

        LineToken::new(LineKind::Unrecognized, indent, trimmed)
    }

    /// Whether `text` mentions a Decision or Outcome marker anywhere.
    pub fn mentions_markers(&self, text: &str) -> bool {
        text.contains(self.markers.decision.as_str()) || text.contains(self.markers.outcome.as_str())
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

fn marker_pattern(name: &'static str, marker: &str) -> Result<String, MarkerError> {
    let marker = marker.trim();
    if marker.is_empty() {
        return Err(MarkerError::Empty(name));
    }
    Ok(regex::escape(marker))
}

/// Trimmed capture group, or None when the line does not match or the payload is empty
fn capture_payload<'a>(pattern: &Regex, line: &'a str, group: &str) -> Option<&'a str> {
    let text = pattern.captures(line)?.name(group)?.as_str().trim();
    (!text.is_empty()).then_some(text)
}

/// Indentation in columns: one per leading whitespace character.
///
/// After normalization the indentation is plain spaces; counting any whitespace
/// keeps unnormalized lines consistent with the `^\s*` matchers.
pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
