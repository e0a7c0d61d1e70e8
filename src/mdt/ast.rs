//! Tree model
//!
//! A parsed transcript is a [TreeNode]: either a [DecisionNode] (a question with
//! labelled branches) or a bare outcome string. Trees are built bottom up by the
//! parser and are not mutated once a child is attached to its parent, so the public
//! API is read only apart from the consuming [DecisionNode::with_branch] builder.
//!
//! The serialized shape is the one downstream storage expects:
//!
//! ```text
//! {"question": "...", "branches": {"Yes": "outcome", "No": {"question": ...}}}
//! ```

pub mod diagnostics;
pub mod node;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use node::{Branch, DecisionNode, TreeNode};
