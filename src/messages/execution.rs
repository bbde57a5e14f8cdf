//! Generated instances, executed cases, outcomes, definitions and attachments.

use super::gherkin::Location;
use serde::{Deserialize, Deserializer};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// One concrete materialization of a scenario (a "pickle").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    /// Instance id.
    pub id: String,
    /// Feature file the instance was generated from.
    #[serde(default)]
    pub uri: String,
    /// Scenario name with example values substituted.
    #[serde(default)]
    pub name: String,
    /// `[scenarioId]` or `[scenarioId, examplesRowId]`.
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
    /// Concrete steps, background steps first.
    #[serde(default)]
    pub steps: Vec<PickleStep>,
}

impl Pickle {
    /// Id of the scenario this instance materializes.
    #[must_use]
    pub fn scenario_id(&self) -> Option<&str> {
        self.ast_node_ids.first().map(String::as_str)
    }
}

/// A concrete step of a generated instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStep {
    /// Resolved step id.
    pub id: String,
    /// Step text with example values substituted.
    #[serde(default)]
    pub text: String,
    /// Ancestor references; the first is the template step id.
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

impl PickleStep {
    /// The template step id this concrete step was generated from.
    #[must_use]
    pub fn template_id(&self) -> Option<&str> {
        self.ast_node_ids.first().map(String::as_str)
    }
}

/// An executed test case bound to one generated instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Case id.
    pub id: String,
    /// Generated instance executed by this case.
    #[serde(default)]
    pub pickle_id: String,
    /// Steps and hooks in execution order.
    #[serde(default)]
    pub test_steps: Vec<TestStep>,
}

/// Per-step record of an executed test case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// Test step id, referenced by outcomes and attachments.
    pub id: String,
    /// Resolved step id; absent for hooks.
    pub pickle_step_id: Option<String>,
    /// Matching step definitions.
    #[serde(default)]
    pub step_definition_ids: Vec<String>,
}

/// Outcome of executing one test step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepFinished {
    /// Executed test step.
    pub test_step_id: String,
    /// Attempt this outcome belongs to.
    #[serde(default)]
    pub test_case_started_id: String,
    /// Status, duration and error message.
    pub test_step_result: TestStepResult,
}

/// Status, duration and message of a finished step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestStepResult {
    /// Status as emitted (`PASSED`, `failed`, ...).
    #[serde(default)]
    pub status: String,
    /// Wall time; absent for skipped steps on some producers.
    pub duration: Option<Duration>,
    /// Error message for failed steps.
    pub message: Option<String>,
}

/// A seconds + nanoseconds pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Duration {
    /// Whole seconds. Accepts a JSON number or a decimal string.
    #[serde(deserialize_with = "seconds_from_number_or_string")]
    pub seconds: u64,
    /// Sub-second nanoseconds.
    pub nanos: u64,
}

impl Duration {
    /// Normalizes to a single nanosecond count, saturating on overflow.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.seconds
            .saturating_mul(NANOS_PER_SEC)
            .saturating_add(self.nanos)
    }
}

fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Int(secs) => Ok(secs),
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        Seconds::Float(secs) => Ok(secs.max(0.0) as u64),
        Seconds::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A glue-code step definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Definition id.
    pub id: String,
    /// Where the definition lives in glue code.
    #[serde(default)]
    pub source_reference: SourceReference,
}

/// A code location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceReference {
    /// File of the definition.
    pub uri: Option<String>,
    /// Line of the definition.
    pub location: Option<Location>,
}

/// Payload attached to a step during execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Payload, encoded per `content_encoding`.
    #[serde(default)]
    pub body: String,
    /// `IDENTITY` or `BASE64`.
    #[serde(default)]
    pub content_encoding: String,
    /// MIME type of the payload.
    #[serde(default)]
    pub media_type: String,
    /// Test step the attachment was produced by.
    pub test_step_id: Option<String>,
    /// Attempt the attachment belongs to.
    pub test_case_started_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn duration_normalizes_to_nanos() {
        let d: Duration = serde_json::from_value(json!({ "seconds": 2, "nanos": 500 })).unwrap();
        assert_eq!(d.as_nanos(), 2_000_000_500);

        let zero: Duration = serde_json::from_value(json!({ "seconds": 0, "nanos": 0 })).unwrap();
        assert_eq!(zero.as_nanos(), 0);
    }

    #[test]
    fn duration_seconds_may_be_a_string() {
        let d: Duration =
            serde_json::from_value(json!({ "seconds": "3", "nanos": 7 })).unwrap();
        assert_eq!(d.as_nanos(), 3_000_000_007);
    }

    #[test]
    fn duration_fields_default_to_zero() {
        let d: Duration = serde_json::from_value(json!({ "nanos": 12 })).unwrap();
        assert_eq!(d.as_nanos(), 12);
    }

    #[test]
    fn step_result_without_duration() {
        let result: TestStepResult =
            serde_json::from_value(json!({ "status": "SKIPPED" })).unwrap();
        assert!(result.duration.is_none());
        assert!(result.message.is_none());
    }

    #[test]
    fn hook_test_step_has_no_pickle_step() {
        let step: TestStep =
            serde_json::from_value(json!({ "id": "t1", "hookId": "h1" })).unwrap();
        assert!(step.pickle_step_id.is_none());
        assert!(step.step_definition_ids.is_empty());
    }

    proptest! {
        #[test]
        fn as_nanos_matches_arithmetic(seconds in 0u64..1_000_000, nanos in 0u64..NANOS_PER_SEC) {
            let d = Duration { seconds, nanos };
            prop_assert_eq!(d.as_nanos(), seconds * NANOS_PER_SEC + nanos);
        }
    }
}
