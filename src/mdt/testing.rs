//! Testing utilities
//!
//!     Transcript text is easy to get subtly wrong by hand: one space of indentation
//!     changes which decision a branch belongs to. Tests should therefore take their input
//!     from the verified sample documents in `docs/samples/` rather than inline strings,
//!     whenever the point of the test is the tree and not one specific line shape.
//!
//!     Each sample `NNN-name.mdt` comes with `NNN-name.json`, the tree it must parse to
//!     (`null` when it holds no tree). When the grammar changes, the samples are the one
//!     place to update.
//!
//!     ```rust,ignore
//!     use mdt::mdt::testing::Samples;
//!
//!     let tree = Samples::parse("010-two-branches");
//!     assert_eq!(tree, Samples::expected("010-two-branches"));
//!     ```
//!
//!     Inline strings remain fine for classifier and normalizer tests, which are about
//!     single lines.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::mdt::ast::TreeNode;
use crate::mdt::parsing::parse;

static TEST_SETUP: Once = Once::new();

/// Access to the verified sample documents
pub struct Samples;

impl Samples {
    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("docs").join("samples")
    }

    /// Names (without extension) of all sample transcripts, sorted
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(Self::dir())
            .expect("samples directory to exist")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "mdt"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }

    /// Transcript text of a sample
    pub fn source(name: &str) -> String {
        let path = Self::dir().join(format!("{name}.mdt"));
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read sample {}: {e}", path.display()))
    }

    /// The tree a sample must parse to
    pub fn expected(name: &str) -> Option<TreeNode> {
        let path = Self::dir().join(format!("{name}.json"));
        let json = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read expectation {}: {e}", path.display()));
        serde_json::from_str(&json)
            .unwrap_or_else(|e| panic!("invalid expectation {}: {e}", path.display()))
    }

    /// Parse a sample with the default parser
    pub fn parse(name: &str) -> Option<TreeNode> {
        parse(&Self::source(name))
            .unwrap_or_else(|e| panic!("sample {name} failed to parse: {e}"))
    }
}

/// Install a stderr tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `debug`.
pub fn init_test_logging() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_test_writer()
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            debug!("Tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!(rust_log = ?env::var("RUST_LOG").ok(), "Test logging ready");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_every_sample_has_an_expectation() {
        let names = Samples::names();
        assert!(!names.is_empty());
        for name in names {
            assert!(
                Samples::dir().join(format!("{name}.json")).exists(),
                "sample {name} has no .json expectation"
            );
        }
    }
}
