//! Condition labels and tree walking
//!
//! Branch labels are free text, but hand-authored trees often use numeric
//! thresholds (`">=120"`, `"130-139"`, `"<80"`). [Condition::parse] interprets a
//! label, and [TreeNode::walk] follows a sequence of answers from the root to an
//! outcome, picking the first branch (in insertion order) whose condition matches.
//!
//! Labels that look numeric but don't parse (`"Low-risk"`) stay textual.

use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::mdt::ast::{DecisionNode, TreeNode};

/// Interpreted branch label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `"a-b"`, inclusive on both ends
    Range(RangeInclusive<i64>),
    /// `">=n"`
    AtLeast(i64),
    /// `">n"`
    Above(i64),
    /// `"<=n"`
    AtMost(i64),
    /// `"<n"`
    Below(i64),
    /// Anything else, matched case-insensitively against text answers
    Label(String),
}

impl Condition {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        let threshold = |prefix: &str| {
            label
                .strip_prefix(prefix)
                .and_then(|rest| rest.trim().parse::<i64>().ok())
        };

        if let Some(n) = threshold(">=") {
            return Condition::AtLeast(n);
        }
        if let Some(n) = threshold("<=") {
            return Condition::AtMost(n);
        }
        if let Some(n) = threshold(">") {
            return Condition::Above(n);
        }
        if let Some(n) = threshold("<") {
            return Condition::Below(n);
        }
        if let Some(range) = parse_range(label) {
            return Condition::Range(range);
        }
        Condition::Label(label.to_string())
    }

    pub fn matches(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (Condition::Range(range), Answer::Number(n)) => range.contains(n),
            (Condition::AtLeast(min), Answer::Number(n)) => n >= min,
            (Condition::Above(min), Answer::Number(n)) => n > min,
            (Condition::AtMost(max), Answer::Number(n)) => n <= max,
            (Condition::Below(max), Answer::Number(n)) => n < max,
            (Condition::Label(label), answer) => label.eq_ignore_ascii_case(answer.as_text().trim()),
            _ => false,
        }
    }
}

/// `"130-139"`: both ends integers, low end first. A leading minus is not a separator.
fn parse_range(label: &str) -> Option<RangeInclusive<i64>> {
    let split = label.char_indices().skip(1).find(|&(_, c)| c == '-')?.0;
    let low = label[..split].trim().parse::<i64>().ok()?;
    let high = label[split + 1..].trim().parse::<i64>().ok()?;
    (low <= high).then_some(low..=high)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Range(range) => write!(f, "{}-{}", range.start(), range.end()),
            Condition::AtLeast(n) => write!(f, ">={n}"),
            Condition::Above(n) => write!(f, ">{n}"),
            Condition::AtMost(n) => write!(f, "<={n}"),
            Condition::Below(n) => write!(f, "<{n}"),
            Condition::Label(label) => write!(f, "{label}"),
        }
    }
}

/// An answer to a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Number(i64),
    Text(String),
}

impl Answer {
    /// Integers become numbers, everything else stays text.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(n) => Answer::Number(n),
            Err(_) => Answer::Text(input.trim().to_string()),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Answer::Number(n) => n.to_string(),
            Answer::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("no branch of '{question}' matches answer '{answer}'")]
    NoMatchingBranch { question: String, answer: String },

    #[error("ran out of answers at '{question}'")]
    OutOfAnswers { question: String },
}

/// One answered question on the way to an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub question: String,
    pub condition: String,
}

/// The result of a successful walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk<'a> {
    pub steps: Vec<Step>,
    pub outcome: &'a str,
}

impl DecisionNode {
    /// First branch whose condition matches `answer`, with its label.
    pub fn select(&self, answer: &Answer) -> Option<(&str, &TreeNode)> {
        self.branches()
            .iter()
            .find(|branch| Condition::parse(branch.condition()).matches(answer))
            .map(|branch| (branch.condition(), branch.node()))
    }
}

impl TreeNode {
    /// Follow `answers` from this node until an outcome is reached.
    ///
    /// Answers left over once an outcome is reached are ignored.
    pub fn walk<I>(&self, answers: I) -> Result<Walk<'_>, WalkError>
    where
        I: IntoIterator<Item = Answer>,
    {
        let mut answers = answers.into_iter();
        let mut steps = Vec::new();
        let mut current = self;

        loop {
            let node = match current {
                TreeNode::Outcome(outcome) => return Ok(Walk { steps, outcome }),
                TreeNode::Decision(node) => node,
            };
            let answer = answers.next().ok_or_else(|| WalkError::OutOfAnswers {
                question: node.question().to_string(),
            })?;
            let (condition, next) = node.select(&answer).ok_or_else(|| WalkError::NoMatchingBranch {
                question: node.question().to_string(),
                answer: answer.as_text(),
            })?;
            tracing::trace!(question = node.question(), condition, "walk");
            steps.push(Step {
                question: node.question().to_string(),
                condition: condition.to_string(),
            });
            current = next;
        }
    }
}
