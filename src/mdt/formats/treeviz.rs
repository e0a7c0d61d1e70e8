//! Treeviz formatter for decision trees
//!
//! One line per node, which makes large trees quick to scan. Nesting is drawn with
//! box-drawing connectors, and each branch line carries its condition label followed
//! by the node it leads to:
//!
//! ```text
//! ◇ Does the patient have generalized tonic-clonic seizures?
//! ├─ Yes ◇ Is valproic acid applicable?
//! │  ├─ Yes ● Prescribe valproic acid.
//! │  └─ No ● Refer to neurologist.
//! └─ No ● Further evaluation needed.
//! ```
//!
//! Icons
//!     Decision: ◇
//!     Outcome: ●

use super::registry::{FormatError, Formatter};
use crate::mdt::ast::{DecisionNode, TreeNode};

const DECISION_ICON: &str = "◇";
const OUTCOME_ICON: &str = "●";

fn node_label(node: &TreeNode) -> String {
    match node {
        TreeNode::Outcome(text) => format!("{OUTCOME_ICON} {text}"),
        TreeNode::Decision(decision) => format!("{DECISION_ICON} {}", decision.question()),
    }
}

fn format_branches(decision: &DecisionNode, prefix: &str, output: &mut String) {
    let count = decision.branches().len();

    for (i, branch) in decision.branches().iter().enumerate() {
        let is_last = i == count - 1;
        let connector = if is_last { "└─" } else { "├─" };

        output.push_str(&format!(
            "{}{} {} {}\n",
            prefix,
            connector,
            branch.condition(),
            node_label(branch.node())
        ));

        if let TreeNode::Decision(child) = branch.node() {
            let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
            format_branches(child, &child_prefix, output);
        }
    }
}

/// Render a tree as treeviz text
pub fn to_treeviz_str(tree: &TreeNode) -> String {
    let mut output = format!("{}\n", node_label(tree));
    if let TreeNode::Decision(decision) = tree {
        format_branches(decision, "", &mut output);
    }
    output
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "One line per node with box-drawing connectors"
    }
}
