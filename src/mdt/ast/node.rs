//! Tree nodes

use serde::{Deserialize, Serialize};

use crate::mdt::config::DuplicatePolicy;

/// A node of a decision tree: a question with branches, or a leaf outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Outcome(String),
    Decision(DecisionNode),
}

impl TreeNode {
    pub fn outcome(text: impl Into<String>) -> Self {
        TreeNode::Outcome(text.into())
    }

    pub fn as_decision(&self) -> Option<&DecisionNode> {
        match self {
            TreeNode::Decision(node) => Some(node),
            TreeNode::Outcome(_) => None,
        }
    }

    pub fn as_outcome(&self) -> Option<&str> {
        match self {
            TreeNode::Outcome(text) => Some(text),
            TreeNode::Decision(_) => None,
        }
    }

    pub fn is_outcome(&self) -> bool {
        matches!(self, TreeNode::Outcome(_))
    }

    /// Number of levels, counting leaves: an outcome is 1, a question with only
    /// leaf branches is 2. A question without branches is 1.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Outcome(_) => 1,
            TreeNode::Decision(node) => {
                1 + node
                    .branches
                    .iter()
                    .map(|branch| branch.node.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// All outcome texts, depth first in branch order.
    pub fn outcomes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_outcomes(&mut out);
        out
    }

    fn collect_outcomes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TreeNode::Outcome(text) => out.push(text),
            TreeNode::Decision(node) => {
                for branch in &node.branches {
                    branch.node.collect_outcomes(out);
                }
            }
        }
    }
}

impl From<DecisionNode> for TreeNode {
    fn from(node: DecisionNode) -> Self {
        TreeNode::Decision(node)
    }
}

impl From<&str> for TreeNode {
    fn from(text: &str) -> Self {
        TreeNode::Outcome(text.to_string())
    }
}

impl From<String> for TreeNode {
    fn from(text: String) -> Self {
        TreeNode::Outcome(text)
    }
}

/// A question and its labelled branches, in insertion order.
///
/// Condition labels are unique within a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNode {
    question: String,
    #[serde(default, with = "branch_map")]
    branches: Vec<Branch>,
}

/// One labelled edge out of a [DecisionNode].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    condition: String,
    node: TreeNode,
}

impl Branch {
    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn node(&self) -> &TreeNode {
        &self.node
    }
}

impl DecisionNode {
    pub fn new(question: impl Into<String>) -> Self {
        DecisionNode {
            question: question.into(),
            branches: Vec::new(),
        }
    }

    /// Add a branch, replacing any existing branch with the same label in place.
    pub fn with_branch(mut self, condition: impl Into<String>, node: impl Into<TreeNode>) -> Self {
        self.insert(condition.into(), node.into(), DuplicatePolicy::LastWins);
        self
    }

    /// Attach a branch according to `policy`.
    ///
    /// Returns true when the label was already present. With `LastWins` the
    /// existing branch keeps its position but takes the new subtree; with
    /// `FirstWins` the new subtree is discarded.
    pub(crate) fn insert(&mut self, condition: String, node: TreeNode, policy: DuplicatePolicy) -> bool {
        match self
            .branches
            .iter_mut()
            .find(|branch| branch.condition == condition)
        {
            Some(existing) => {
                if policy == DuplicatePolicy::LastWins {
                    existing.node = node;
                }
                true
            }
            None => {
                self.branches.push(Branch { condition, node });
                false
            }
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Subtree for an exact condition label.
    pub fn get(&self, condition: &str) -> Option<&TreeNode> {
        self.branches
            .iter()
            .find(|branch| branch.condition == condition)
            .map(|branch| &branch.node)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|branch| branch.condition.as_str())
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Branches serialize as a map keyed by condition label, keeping insertion order.
mod branch_map {
    use super::{Branch, TreeNode};
    use crate::mdt::config::DuplicatePolicy;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(branches: &[Branch], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(branches.len()))?;
        for branch in branches {
            map.serialize_entry(&branch.condition, &branch.node)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Branch>, D::Error> {
        deserializer.deserialize_map(BranchVisitor)
    }

    struct BranchVisitor;

    impl<'de> Visitor<'de> for BranchVisitor {
        type Value = Vec<Branch>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a map from condition labels to subtrees")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut node = super::DecisionNode::new("");
            while let Some((condition, child)) = access.next_entry::<String, TreeNode>()? {
                node.insert(condition, child, DuplicatePolicy::LastWins);
            }
            Ok(node.branches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seizure_tree() -> TreeNode {
        DecisionNode::new("Does the patient have generalized tonic-clonic seizures?")
            .with_branch(
                "Yes",
                DecisionNode::new("Is valproic acid applicable?")
                    .with_branch("Yes", "Prescribe valproic acid.")
                    .with_branch("No", "Refer to neurologist."),
            )
            .with_branch("No", "Further evaluation needed.")
            .into()
    }

    #[test]
    fn test_depth_counts_leaves() {
        assert_eq!(TreeNode::outcome("x").depth(), 1);
        assert_eq!(TreeNode::from(DecisionNode::new("Q?")).depth(), 1);
        assert_eq!(seizure_tree().depth(), 3);
    }

    #[test]
    fn test_outcomes_in_branch_order() {
        assert_eq!(
            seizure_tree().outcomes(),
            vec![
                "Prescribe valproic acid.",
                "Refer to neurologist.",
                "Further evaluation needed."
            ]
        );
    }

    #[test]
    fn test_last_wins_keeps_position() {
        let mut node = DecisionNode::new("Q?");
        assert!(!node.insert("Yes".into(), "a".into(), DuplicatePolicy::LastWins));
        assert!(!node.insert("No".into(), "b".into(), DuplicatePolicy::LastWins));
        assert!(node.insert("Yes".into(), "c".into(), DuplicatePolicy::LastWins));

        assert_eq!(node.conditions().collect::<Vec<_>>(), vec!["Yes", "No"]);
        assert_eq!(node.get("Yes"), Some(&TreeNode::outcome("c")));
    }

    #[test]
    fn test_first_wins_discards_later() {
        let mut node = DecisionNode::new("Q?");
        node.insert("Yes".into(), "a".into(), DuplicatePolicy::FirstWins);
        assert!(node.insert("Yes".into(), "c".into(), DuplicatePolicy::FirstWins));
        assert_eq!(node.get("Yes"), Some(&TreeNode::outcome("a")));
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_serializes_to_nested_maps_in_order() {
        let json = serde_json::to_string(&seizure_tree()).unwrap();
        assert_eq!(
            json,
            r#"{"question":"Does the patient have generalized tonic-clonic seizures?","branches":{"Yes":{"question":"Is valproic acid applicable?","branches":{"Yes":"Prescribe valproic acid.","No":"Refer to neurologist."}},"No":"Further evaluation needed."}}"#
        );
    }

    #[test]
    fn test_deserializes_from_json() {
        let json = serde_json::to_string(&seizure_tree()).unwrap();
        let back: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seizure_tree());
    }

    #[test]
    fn test_missing_branches_default_to_empty() {
        let node: TreeNode = serde_json::from_str(r#"{"question": "Q?"}"#).unwrap();
        assert_eq!(node, TreeNode::from(DecisionNode::new("Q?")));
    }

    #[test]
    fn test_bare_string_is_an_outcome() {
        let node: TreeNode = serde_json::from_str(r#""Rest.""#).unwrap();
        assert_eq!(node.as_outcome(), Some("Rest."));
        assert!(node.as_decision().is_none());
    }
}
