//! Cukejson: cucumber message streams to cucumber JSON reports.
//!
//! # Overview
//!
//! A test run emits an NDJSON stream of cucumber messages: parsed Gherkin
//! documents, generated pickles, test cases, step outcomes, step definitions
//! and attachments. This crate joins those events back onto the document tree
//! and produces the hierarchical feature/element/step report consumed by
//! existing report tooling.
//!
//! # Guarantees
//!
//! - **Exact joins**: events are related by exact id equality, never by text search
//! - **Positional outlines**: the Nth example row resolves to the Nth generated instance
//! - **Absence is not an error**: missing outcomes, matches or attachments yield defaults
//! - **Malformed lines are skipped**: each one is logged with its raw text
//! - **Validated output**: the assembled report is checked against a JSON schema
//!
//! # Module Structure
//!
//! - [`messages`]: Typed input events
//! - [`index`]: Categorized event index
//! - [`correlate`]: Joins from document steps to outcomes, definitions and attachments
//! - [`report`]: Output model, tree builder, emitter and summary
//! - [`formatter`]: The conversion entry point
//! - [`config`]: Formatter configuration
//! - [`io`](mod@io): File input, output and schema loading
//! - [`error`](mod@error): Error types
//!
//! # Example
//!
//! ```no_run
//! use cukejson::{Formatter, FormatterConfig};
//! use std::path::Path;
//!
//! let formatter = Formatter::new(FormatterConfig::default().with_pretty(true));
//! formatter.convert_file(Path::new("messages.ndjson"), Path::new("cucumber.json"))?;
//! # Ok::<(), cukejson::FormatError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod correlate;
pub mod error;
pub mod formatter;
pub mod index;
pub mod io;
pub mod messages;
pub mod report;
pub(crate) mod tracing_compat;

pub use config::FormatterConfig;
pub use correlate::{Correlator, ResolvedStep};
pub use error::{
    FormatError, MalformedEventError, Result, SchemaValidationError, StructureError,
    StructureErrorKind,
};
pub use formatter::{Formatter, convert_file};
pub use index::EventIndex;
pub use messages::{Event, EventCategory};
pub use report::{FeatureReport, ReportSummary};
