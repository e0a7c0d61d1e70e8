//! Configuration loader
//!
//! `defaults/mdt.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. Callers layer user-specific files on top of
//! those defaults via [`Loader`] before deserializing into [`MdtConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/mdt.default.toml");

/// Top-level configuration consumed by the parser and the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct MdtConfig {
    pub lexing: LexingConfig,
    pub markers: Markers,
    pub parsing: ParsingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexingConfig {
    pub tab_width: usize,
}

/// The literal line markers of the transcript grammar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Markers {
    pub decision: String,
    pub branch: String,
    pub outcome: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            decision: "DECISION POINT:".to_string(),
            branch: "IF".to_string(),
            outcome: "OUTCOME:".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsingConfig {
    pub max_depth: usize,
    pub duplicate_conditions: DuplicatePolicy,
}

/// Which branch survives when a Decision repeats a condition label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    FirstWins,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MdtConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MdtConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.lexing.tab_width, 4);
        assert_eq!(config.markers, Markers::default());
        assert_eq!(config.parsing.max_depth, 60);
        assert_eq!(config.parsing.duplicate_conditions, DuplicatePolicy::LastWins);
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parsing.max_depth", 8_i64)
            .unwrap()
            .set_override("parsing.duplicate_conditions", "first-wins")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.parsing.max_depth, 8);
        assert_eq!(config.parsing.duplicate_conditions, DuplicatePolicy::FirstWins);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[markers]\noutcome = \"RESULT:\"").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.markers.outcome, "RESULT:");
        assert_eq!(config.markers.decision, "DECISION POINT:");
    }

    #[test]
    fn optional_file_may_be_missing() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/mdt.toml")
            .build()
            .unwrap();
        assert_eq!(config.lexing.tab_width, 4);
    }
}
