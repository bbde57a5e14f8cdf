//! Formatter configuration.
//!
//! Defaults reproduce the lenient behavior: structural problems skip the
//! affected scenario, only the first examples table of an outline is used,
//! the report is validated against the built-in schema and written compact.
//!
//! With the `config-file` feature a configuration can be loaded from TOML:
//!
//! ```toml
//! strict = true
//! pretty = true
//! validate_schema = true
//! expand_all_examples = false
//! schema_path = "schemas/report.json"
//! ```

use std::path::PathBuf;

#[cfg(feature = "config-file")]
use crate::error::{FormatError, Result};
#[cfg(feature = "config-file")]
use std::path::Path;

/// Options controlling a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default, deny_unknown_fields))]
pub struct FormatterConfig {
    /// Fail on structural document problems instead of skipping the scenario.
    pub strict: bool,
    /// Pretty-print the written report.
    pub pretty: bool,
    /// Validate the assembled report against the schema.
    pub validate_schema: bool,
    /// Use every examples table of an outline, not only the first.
    pub expand_all_examples: bool,
    /// Schema file to use instead of the built-in one.
    pub schema_path: Option<PathBuf>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            strict: false,
            pretty: false,
            validate_schema: true,
            expand_all_examples: false,
            schema_path: None,
        }
    }
}

impl FormatterConfig {
    /// Sets strict structure handling.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets pretty-printed output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enables or disables schema validation.
    #[must_use]
    pub const fn with_validate_schema(mut self, validate: bool) -> Self {
        self.validate_schema = validate;
        self
    }

    /// Sets whether all examples tables are expanded.
    #[must_use]
    pub const fn with_expand_all_examples(mut self, expand: bool) -> Self {
        self.expand_all_examples = expand;
        self
    }

    /// Uses the schema at `path` instead of the built-in one.
    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Parses a TOML configuration. Missing keys keep their defaults.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FormatError::Config(e.to_string()))
    }

    /// Loads a TOML configuration file.
    #[cfg(feature = "config-file")]
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| FormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
