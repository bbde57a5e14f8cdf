//! Error types for report conversion.
//!
//! Only a few conditions abort a conversion run: unreadable input, an
//! unusable schema, a report that fails schema validation, and (in strict
//! mode) a structurally inconsistent document. Malformed individual events
//! are reported through [`MalformedEventError`] values and never abort.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Fatal errors surfaced by a conversion run.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The input event stream could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The serialized report could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The validation schema could not be loaded or compiled.
    #[error("unusable report schema: {0}")]
    Schema(String),
    /// The assembled report does not conform to the schema.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),
    /// A document substructure is inconsistent and strict mode is on.
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// JSON (de)serialization of the report failed.
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The formatter configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FormatError {
    /// Returns `true` if this error came from schema validation.
    #[must_use]
    pub const fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaValidation(_))
    }
}

/// One input line that could not be parsed into a typed event.
///
/// Collected by the event index and logged; the line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed event on line {line}: {reason}")]
pub struct MalformedEventError {
    /// 1-based line number in the input stream.
    pub line: usize,
    /// The offending raw text.
    pub raw: String,
    /// Parser diagnostic.
    pub reason: String,
}

impl MalformedEventError {
    /// Creates a new malformed-event record.
    #[must_use]
    pub fn new(line: usize, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// The assembled report violated the fixed output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    violations: Vec<String>,
}

impl SchemaValidationError {
    /// Creates a validation error from the collected violations.
    #[must_use]
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    /// Individual schema violations, in validator order.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "report schema validation failed with {} violation(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

/// Kind of structural inconsistency in a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureErrorKind {
    /// A templated scenario declares no examples table.
    MissingExamples,
    /// An examples table has no body rows array.
    MissingTableBody,
    /// An examples table has body rows but no header row.
    MissingTableHeader,
    /// An examples row has fewer cells than the header.
    ShortExamplesRow,
}

impl StructureErrorKind {
    /// Returns a short description of the inconsistency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingExamples => "templated scenario has no examples table",
            Self::MissingTableBody => "examples table has no body",
            Self::MissingTableHeader => "examples table has rows but no header",
            Self::ShortExamplesRow => "examples row is shorter than its header",
        }
    }
}

/// A structurally inconsistent document substructure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} in scenario '{scenario}' (line {line})", kind.as_str())]
pub struct StructureError {
    /// What is wrong.
    pub kind: StructureErrorKind,
    /// Identifier of the affected scenario (`feature;scenario`).
    pub scenario: String,
    /// Source line of the affected scenario.
    pub line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_validation_lists_every_violation() {
        let err = SchemaValidationError::new(vec![
            "\"line\" is a required property".into(),
            "42 is not of type \"string\"".into(),
        ]);
        let display = err.to_string();
        assert!(display.contains("2 violation(s)"));
        assert!(display.contains("required property"));
        assert!(display.contains("not of type"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn structure_error_display_names_scenario() {
        let err = StructureError {
            kind: StructureErrorKind::MissingTableBody,
            scenario: "Login;Login as <user>".into(),
            line: 12,
        };
        assert_eq!(
            err.to_string(),
            "examples table has no body in scenario 'Login;Login as <user>' (line 12)"
        );
    }

    #[test]
    fn malformed_event_keeps_raw_text() {
        let err = MalformedEventError::new(3, "{\"pickle\":", "EOF while parsing");
        assert_eq!(err.line, 3);
        assert_eq!(err.raw, "{\"pickle\":");
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn format_error_wraps_sources() {
        let err: FormatError = SchemaValidationError::new(vec!["x".into()]).into();
        assert!(err.is_schema_violation());

        let err = FormatError::Read {
            path: PathBuf::from("/tmp/missing.ndjson"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_schema_violation());
        assert!(err.to_string().contains("/tmp/missing.ndjson"));
    }
}
