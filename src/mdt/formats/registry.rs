//! Format registry for tree serialization
//!
//! This module provides a pluggable registry of serialization formats.
//! Each format implements the `Formatter` trait and can be registered with `FormatRegistry`.

use std::collections::HashMap;
use thiserror::Error;

use crate::mdt::ast::TreeNode;
use crate::mdt::config::Markers;

/// Error that can occur during formatting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Trait for tree formatters
///
/// Implementors provide a way to serialize a tree to a string representation.
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g., "json", "treeviz")
    fn name(&self) -> &str;

    /// Serialize a tree to this format
    fn serialize(&self, tree: &TreeNode) -> Result<String, FormatError>;

    /// Output for a parse that found no tree
    fn serialize_absent(&self) -> String {
        String::new()
    }

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }
}

/// Registry of tree formatters
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter
    ///
    /// If a formatter with the same name already exists, it will be replaced.
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    /// Get a formatter by name
    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Serialize a tree (or its absence) using the specified format
    pub fn serialize(&self, tree: Option<&TreeNode>, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        match tree {
            Some(tree) => formatter.serialize(tree),
            None => Ok(formatter.serialize_absent()),
        }
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a registry with the built-in formatters
    pub fn with_defaults() -> Self {
        Self::with_markers(Markers::default())
    }

    /// Built-in formatters, with the outline written using `markers`
    pub fn with_markers(markers: Markers) -> Self {
        let mut registry = Self::new();

        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);
        registry.register(super::TreevizFormatter);
        registry.register(super::OutlineFormatter::new(markers));

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
