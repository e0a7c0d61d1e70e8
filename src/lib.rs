//! # mdt
//!
//! Turns the semi-structured decision tree transcripts produced by an upstream
//! generator into a canonical nested tree.
//!
//! ```text
//! DECISION POINT: Is valproic acid applicable?
//!     IF 'Yes':
//!         OUTCOME: Prescribe valproic acid.
//!     IF 'No':
//!         OUTCOME: Refer to neurologist.
//! ```
//!
//! The entry points are [`mdt::parsing::parse`] and [`mdt::parsing::TreeParser`].
//!
//! ## Testing
//!
//! For testing guidelines, see the [testing module](mdt::testing).

pub mod mdt;

pub use mdt::ast::{Branch, DecisionNode, TreeNode};
pub use mdt::parsing::{parse, parse_with_diagnostics, TreeParser};
