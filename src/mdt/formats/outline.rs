//! Outline formatter
//!
//! Converts a tree back into transcript text. The output is canonical: four spaces
//! per level, branches one level below their question, and children one level below
//! their branch. Parsing an outline yields a tree equal to the one it was made from,
//! which makes this the format to use when a tree has to go back to a generator (for
//! example in a synthesis prompt).

use super::registry::{FormatError, Formatter};
use crate::mdt::ast::TreeNode;
use crate::mdt::config::Markers;

const INDENT: &str = "    ";

pub struct OutlineFormatter {
    markers: Markers,
}

impl OutlineFormatter {
    pub fn new(markers: Markers) -> Self {
        OutlineFormatter { markers }
    }

    fn write_node(&self, node: &TreeNode, level: usize, output: &mut String) {
        let indent = INDENT.repeat(level);
        match node {
            TreeNode::Outcome(text) => {
                output.push_str(&format!("{indent}{} {text}\n", self.markers.outcome));
            }
            TreeNode::Decision(decision) => {
                output.push_str(&format!(
                    "{indent}{} {}\n",
                    self.markers.decision,
                    decision.question()
                ));
                let branch_indent = INDENT.repeat(level + 1);
                for branch in decision.branches() {
                    output.push_str(&format!(
                        "{branch_indent}{} '{}':\n",
                        self.markers.branch,
                        branch.condition()
                    ));
                    self.write_node(branch.node(), level + 2, output);
                }
            }
        }
    }
}

impl Default for OutlineFormatter {
    fn default() -> Self {
        Self::new(Markers::default())
    }
}

impl Formatter for OutlineFormatter {
    fn name(&self) -> &str {
        "outline"
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, FormatError> {
        let mut output = String::new();
        self.write_node(tree, 0, &mut output);
        Ok(output)
    }

    fn description(&self) -> &str {
        "Canonically indented DECISION POINT / IF / OUTCOME transcript"
    }
}
