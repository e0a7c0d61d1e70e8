//! JSON and YAML output
//!
//! Both use the tree's serde representation, so they share one shape: a decision is
//! `{question, branches}` with branches keyed by condition label in source order,
//! and an outcome is a bare string. An absent tree is `null`.

use super::registry::{FormatError, Formatter};
use crate::mdt::ast::TreeNode;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, FormatError> {
        serde_json::to_string_pretty(tree)
            .map(|json| json + "\n")
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn serialize_absent(&self) -> String {
        "null\n".to_string()
    }

    fn description(&self) -> &str {
        "Nested question/branches maps as JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, FormatError> {
        serde_yaml::to_string(tree).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn serialize_absent(&self) -> String {
        "null\n".to_string()
    }

    fn description(&self) -> &str {
        "Nested question/branches maps as YAML"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdt::ast::DecisionNode;

    fn tree() -> TreeNode {
        DecisionNode::new("Q?")
            .with_branch("Yes", "Go.")
            .with_branch("No", DecisionNode::new("R?").with_branch("Maybe", "Wait."))
            .into()
    }

    #[test]
    fn test_json_shape() {
        let json = JsonFormatter.serialize(&tree()).unwrap();
        insta::assert_snapshot!(json.trim_end(), @r###"
        {
          "question": "Q?",
          "branches": {
            "Yes": "Go.",
            "No": {
              "question": "R?",
              "branches": {
                "Maybe": "Wait."
              }
            }
          }
        }
        "###);
    }

    #[test]
    fn test_yaml_loads_back() {
        let yaml = YamlFormatter.serialize(&tree()).unwrap();
        let back: TreeNode = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, tree());
    }

    #[test]
    fn test_absent_tree_is_null() {
        assert_eq!(JsonFormatter.serialize_absent(), "null\n");
        assert_eq!(YamlFormatter.serialize_absent(), "null\n");
    }
}
