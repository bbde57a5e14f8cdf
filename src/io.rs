//! File input and output for the formatter.

use crate::config::FormatterConfig;
use crate::error::{FormatError, Result};
use crate::report::model::FeatureReport;
use crate::tracing_compat::warn;
use serde_json::Value;
use std::fs;
use std::path::Path;

const BUILTIN_SCHEMA: &str = include_str!("../schema/cucumber_report_schema.json");

/// Reads an NDJSON event stream and returns its lines in order.
///
/// Lines are returned untrimmed; blank lines are dropped later by the index.
/// Invalid UTF-8 is replaced with U+FFFD per line, so one corrupt byte never
/// rejects the whole stream.
pub fn read_structured_input(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|source| FormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_lines(&bytes))
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .enumerate()
        .map(|(offset, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(text) => text.to_owned(),
                Err(_) => {
                    warn!(line = offset + 1, "replacing invalid UTF-8 in input line");
                    String::from_utf8_lossy(line).into_owned()
                }
            }
        })
        .collect()
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| FormatError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// The schema shipped with the crate.
pub fn builtin_schema() -> Result<Value> {
    serde_json::from_str(BUILTIN_SCHEMA).map_err(|e| FormatError::Schema(e.to_string()))
}

/// Loads the schema selected by `config`.
pub fn load_schema(config: &FormatterConfig) -> Result<Value> {
    let Some(path) = config.schema_path.as_deref() else {
        return builtin_schema();
    };
    let text = fs::read_to_string(path).map_err(|source| FormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text)
        .map_err(|e| FormatError::Schema(format!("{}: {e}", path.display())))
}

/// Reads a previously written report as a raw JSON value.
pub fn read_report_value(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|source| FormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Reads a previously written report.
pub fn read_report(path: &Path) -> Result<Vec<FeatureReport>> {
    Ok(serde_json::from_value(read_report_value(path)?)?)
}
