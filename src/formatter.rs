//! The conversion entry point.
//!
//! A [`Formatter`] runs one self-contained conversion: index the event
//! stream, correlate, build the element trees, emit the feature reports,
//! validate them and serialize. Nothing is cached between calls.

use crate::config::FormatterConfig;
use crate::correlate::Correlator;
use crate::error::Result;
use crate::index::EventIndex;
use crate::io::{load_schema, read_structured_input, write_output};
use crate::messages::EventCategory;
use crate::report::builder::TreeBuilder;
use crate::report::emitter::{ReportEmitter, SchemaValidator};
use crate::report::model::FeatureReport;
use crate::tracing_compat::{debug, info};
use std::path::Path;

/// Converts cucumber message streams into JSON reports.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    /// Creates a formatter with `config`.
    #[must_use]
    pub const fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Converts raw NDJSON lines into a validated report.
    pub fn convert_lines<I, S>(&self, lines: I) -> Result<Vec<FeatureReport>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = EventIndex::from_lines(lines);
        debug!(
            events = index.len(),
            malformed = index.malformed().len(),
            documents = index.count(EventCategory::Document),
            pickles = index.count(EventCategory::Pickle),
            outcomes = index.count(EventCategory::TestStepFinished),
            "event stream indexed"
        );

        let correlator = Correlator::new(&index);
        let builder = TreeBuilder::new(&correlator)
            .with_strict(self.config.strict)
            .with_expand_all_examples(self.config.expand_all_examples);
        let report = ReportEmitter::new(builder).emit(index.documents())?;

        if self.config.validate_schema {
            self.validate(&report)?;
        }
        Ok(report)
    }

    /// Validates `report` against the configured schema.
    pub fn validate(&self, report: &[FeatureReport]) -> Result<()> {
        debug!(
            schema = %self
                .config
                .schema_path
                .as_deref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
            "loading report schema"
        );
        let schema = load_schema(&self.config)?;
        SchemaValidator::new(&schema)?.validate(report)
    }

    /// Serializes `report`, pretty-printed if configured.
    pub fn render(&self, report: &[FeatureReport]) -> Result<String> {
        let text = if self.config.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(text)
    }

    /// Reads `input`, converts it and writes the report to `output`.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<Vec<FeatureReport>> {
        info!(
            "Start formatting file '{}' into '{}'",
            input.display(),
            output.display()
        );
        let lines = read_structured_input(input)?;
        let report = self.convert_lines(&lines)?;
        write_output(output, &self.render(&report)?)?;
        info!("Finished formatting file '{}'", input.display());
        Ok(report)
    }
}

/// Converts `input` into `output` with the default configuration.
pub fn convert_file(input: &Path, output: &Path) -> Result<Vec<FeatureReport>> {
    Formatter::default().convert_file(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::report::model::ElementType;
    use serde_json::{Value, json};

    fn lines(events: &[Value]) -> Vec<String> {
        events.iter().map(Value::to_string).collect()
    }

    fn one_step_stream(status: &str) -> Vec<String> {
        lines(&[
            json!({ "meta": { "protocolVersion": "22.0.0" } }),
            json!({ "gherkinDocument": {
                "uri": "features/a.feature",
                "feature": {
                    "keyword": "Feature", "name": "A", "location": { "line": 1 },
                    "children": [{ "scenario": {
                        "id": "sc1", "keyword": "Scenario", "name": "one",
                        "location": { "line": 3 },
                        "steps": [{ "id": "st1", "keyword": "Given ", "text": "a step",
                            "location": { "line": 4 } }]
                    } }]
                }
            } }),
            json!({ "pickle": { "id": "p1", "uri": "features/a.feature", "name": "one",
                "astNodeIds": ["sc1"],
                "steps": [{ "id": "ps1", "text": "a step", "astNodeIds": ["st1"] }] } }),
            json!({ "stepDefinition": { "id": "d1",
                "sourceReference": { "uri": "steps/a.rs", "location": { "line": 12 } } } }),
            json!({ "testCase": { "id": "tc1", "pickleId": "p1",
                "testSteps": [{ "id": "ts1", "pickleStepId": "ps1", "stepDefinitionIds": ["d1"] }] } }),
            json!({ "testStepFinished": { "testStepId": "ts1", "testCaseStartedId": "tcs1",
                "testStepResult": { "status": status,
                    "duration": { "seconds": 2, "nanos": 500 } } } }),
        ])
    }

    #[test]
    fn round_trip_single_step() {
        let report = Formatter::default()
            .convert_lines(one_step_stream("PASSED"))
            .unwrap();
        assert_eq!(report.len(), 1);
        let feature = &report[0];
        assert_eq!(feature.elements.len(), 1);
        let scenario = &feature.elements[0];
        assert_eq!(scenario.element_type, ElementType::Scenario);
        assert_eq!(scenario.id, "A;one");
        assert_eq!(scenario.steps.len(), 1);
        let step = &scenario.steps[0];
        assert_eq!(step.result.status, "passed");
        assert_eq!(step.result.duration, 2_000_000_500);
        assert_eq!(step.step_match.location, "steps/a.rs:12");
    }

    #[test]
    fn malformed_lines_do_not_abort() {
        let mut stream = one_step_stream("passed");
        stream.insert(1, "{ not json".to_string());
        stream.insert(2, String::new());
        let report = Formatter::default().convert_lines(&stream).unwrap();
        assert_eq!(report[0].elements[0].steps[0].result.status, "passed");
    }

    #[test]
    fn render_compact_and_pretty() {
        let report = Formatter::default()
            .convert_lines(one_step_stream("passed"))
            .unwrap();
        let compact = Formatter::default().render(&report).unwrap();
        assert!(!compact.contains('\n'));
        let pretty = Formatter::new(FormatterConfig::default().with_pretty(true))
            .render(&report)
            .unwrap();
        assert!(pretty.contains('\n'));
        let a: Value = serde_json::from_str(&compact).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0]["elements"][0]["steps"][0]["match"]["location"], "steps/a.rs:12");
        assert_eq!(a[0]["elements"][0]["type"], "scenario");
    }

    #[test]
    fn rejecting_schema_aborts_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("strict.json");
        std::fs::write(&schema, r#"{"type":"array","maxItems":0}"#).unwrap();
        let formatter = Formatter::new(FormatterConfig::default().with_schema_path(&schema));
        let err = formatter
            .convert_lines(one_step_stream("passed"))
            .unwrap_err();
        assert!(err.is_schema_violation(), "{err}");

        let skip = Formatter::new(
            FormatterConfig::default()
                .with_schema_path(&schema)
                .with_validate_schema(false),
        );
        assert_eq!(skip.convert_lines(one_step_stream("passed")).unwrap().len(), 1);
    }

    #[test]
    fn convert_file_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("events.ndjson");
        let output = dir.path().join("report.json");
        std::fs::write(&input, one_step_stream("failed").join("\n")).unwrap();

        let report = convert_file(&input, &output).unwrap();
        let written: Vec<FeatureReport> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, report);
        assert_eq!(written[0].elements[0].steps[0].result.status, "failed");
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_file(&dir.path().join("none"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, FormatError::Read { .. }), "{err}");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn empty_stream_yields_empty_report() {
        let report = Formatter::default().convert_lines(Vec::<String>::new()).unwrap();
        assert!(report.is_empty());
    }
}
