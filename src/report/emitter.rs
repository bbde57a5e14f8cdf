//! Feature-level report documents and schema validation.

use crate::error::{FormatError, Result, SchemaValidationError};
use crate::messages::{Feature, GherkinDocument};
use crate::report::builder::{TreeBuilder, tag_reports};
use crate::report::model::{CommentReport, FeatureReport};
use crate::tracing_compat::{debug, error, info};
use serde_json::Value;

/// Produces the ordered list of feature reports, one per document that has
/// a feature.
#[derive(Debug)]
pub struct ReportEmitter<'c, 'a> {
    builder: TreeBuilder<'c, 'a>,
}

impl<'c, 'a> ReportEmitter<'c, 'a> {
    /// Creates an emitter that assembles elements with `builder`.
    #[must_use]
    pub fn new(builder: TreeBuilder<'c, 'a>) -> Self {
        Self { builder }
    }

    /// Emits one report per document, in document order.
    pub fn emit<'d, I>(&self, documents: I) -> Result<Vec<FeatureReport>>
    where
        I: IntoIterator<Item = &'d GherkinDocument>,
    {
        let mut reports = Vec::new();
        for document in documents {
            let Some(feature) = document.feature.as_ref() else {
                debug!(uri = %document.uri, "document has no feature, skipping");
                continue;
            };
            reports.push(self.feature_report(document, feature)?);
        }
        Ok(reports)
    }

    /// Emits the report of a single feature.
    pub fn feature_report(
        &self,
        document: &GherkinDocument,
        feature: &Feature,
    ) -> Result<FeatureReport> {
        Ok(FeatureReport {
            comments: document
                .comments
                .iter()
                .map(|comment| CommentReport {
                    line: comment.location.line,
                    value: comment.text.clone(),
                })
                .collect(),
            description: feature.description.clone(),
            elements: self.builder.build(feature)?,
            id: feature.name.clone(),
            keyword: feature.keyword.clone(),
            line: feature.location.line,
            name: feature.name.clone(),
            uri: document.uri.clone(),
            tags: tag_reports(&feature.tags),
        })
    }
}

/// Compiled output schema.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compiles `schema` (JSON-Schema draft 7).
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = jsonschema::draft7::options()
            .build(schema)
            .map_err(|e| FormatError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Validates an assembled report.
    pub fn validate(&self, report: &[FeatureReport]) -> Result<()> {
        let value = serde_json::to_value(report)?;
        self.validate_value(&value)
    }

    /// Validates an already serialized report.
    pub fn validate_value(&self, report: &Value) -> Result<()> {
        info!("Start report JSON schema validation");
        let violations: Vec<String> = self
            .validator
            .iter_errors(report)
            .map(|violation| violation.to_string())
            .collect();
        if violations.is_empty() {
            info!("Report JSON schema validation passed");
            return Ok(());
        }
        error!(
            violations = violations.len(),
            first = %violations[0],
            "report JSON schema validation failed"
        );
        Err(SchemaValidationError::new(violations).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::Correlator;
    use crate::index::EventIndex;
    use crate::io::builtin_schema;
    use serde_json::json;

    fn document(value: Value) -> GherkinDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn emits_feature_fields() {
        let doc = document(json!({
            "uri": "features/login.feature",
            "comments": [{ "location": { "line": 1 }, "text": "# owner: auth" }],
            "feature": {
                "keyword": "Feature",
                "name": "Login",
                "description": "  users sign in",
                "location": { "line": 3 },
                "tags": [{ "name": "@auth" }, { "name": "@web" }],
                "children": [],
            }
        }));
        let idx = EventIndex::default();
        let correlator = Correlator::new(&idx);
        let emitter = ReportEmitter::new(TreeBuilder::new(&correlator));
        let reports = emitter.emit([&doc]).unwrap();

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.id, "Login");
        assert_eq!(report.name, "Login");
        assert_eq!(report.line, 3);
        assert_eq!(report.uri, "features/login.feature");
        assert_eq!(report.comments[0].line, 1);
        assert_eq!(report.comments[0].value, "# owner: auth");
        let tags: Vec<_> = report.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, ["@auth", "@web"]);
    }

    #[test]
    fn documents_without_feature_are_skipped() {
        let empty = document(json!({ "uri": "empty.feature" }));
        let idx = EventIndex::default();
        let correlator = Correlator::new(&idx);
        let emitter = ReportEmitter::new(TreeBuilder::new(&correlator));
        assert!(emitter.emit([&empty]).unwrap().is_empty());
    }

    #[test]
    fn builtin_schema_accepts_emitted_report() {
        let doc = document(json!({
            "uri": "a.feature",
            "feature": { "keyword": "Feature", "name": "A", "location": { "line": 1 },
                "children": [{ "scenario": { "id": "s1", "keyword": "Scenario", "name": "x",
                    "steps": [{ "id": "st1", "keyword": "Given ", "text": "y" }] } }] }
        }));
        let idx = EventIndex::default();
        let correlator = Correlator::new(&idx);
        let reports = ReportEmitter::new(TreeBuilder::new(&correlator))
            .emit([&doc])
            .unwrap();

        let validator = SchemaValidator::new(&builtin_schema().unwrap()).unwrap();
        validator.validate(&reports).unwrap();
    }

    #[test]
    fn schema_violation_is_fatal() {
        let validator = SchemaValidator::new(&builtin_schema().unwrap()).unwrap();
        let err = validator
            .validate_value(&json!([{ "name": "missing everything else" }]))
            .unwrap_err();
        assert!(err.is_schema_violation());
        let FormatError::SchemaValidation(inner) = err else {
            panic!("expected schema validation error");
        };
        assert!(!inner.violations().is_empty());
    }

    #[test]
    fn uncompilable_schema_is_reported() {
        let err = SchemaValidator::new(&json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, FormatError::Schema(_)), "{err}");
    }
}
