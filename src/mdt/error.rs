//! Error types
//!
//! Parsing is lenient: unrecognized lines, dropped branches and missing roots are
//! not errors (see [`crate::mdt::ast::diagnostics`]). The only hard parse failure
//! is nesting beyond the configured depth limit. The remaining variants belong to
//! the surfaces around the parser (configuration, serialization, file access,
//! walking a finished tree).

use std::path::PathBuf;
use thiserror::Error;

use crate::mdt::conditions::WalkError;
use crate::mdt::formats::FormatError;

/// Errors raised by the tree builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A Decision nested deeper than the configured limit
    #[error("malformed input: decision at line {line} nests {depth} levels deep (limit {limit})")]
    MalformedInput {
        line: usize,
        depth: usize,
        limit: usize,
    },
}

impl ParseError {
    /// Move the reported line down by `lines`, for text embedded in a larger input.
    pub fn offset_lines(self, lines: usize) -> Self {
        match self {
            ParseError::MalformedInput { line, depth, limit } => ParseError::MalformedInput {
                line: line + lines,
                depth,
                limit,
            },
        }
    }
}

/// Errors raised while compiling line matchers from configured markers
#[derive(Error, Debug, Clone)]
pub enum MarkerError {
    #[error("the {0} marker must not be empty")]
    Empty(&'static str),

    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Top-level error for library consumers and the CLI
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Marker(#[from] MarkerError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("no decision tree found in {0}")]
    NoTree(String),

    #[error("{} is not a stored decision tree: {source}", path.display())]
    StoredTree {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
