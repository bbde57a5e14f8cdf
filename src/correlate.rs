//! Step correlation across event categories.
//!
//! The chain is: template step id (document) → resolved step id (generated
//! instance) → executed test step → outcome, attachments and definition.
//!
//! All joins use exact id equality over indices built once in
//! [`Correlator::new`]. Repeated instances of one scenario share template
//! step ids; the `instance_index` argument picks the Nth generated instance
//! that contains the template id, in input order.

use crate::index::EventIndex;
use crate::messages::{Attachment, Pickle, PickleStep, StepDefinition, TestStep, TestStepFinished};
use crate::report::model::{Embedding, StepMatch, StepResult};
use std::collections::HashMap;

/// Everything known about one concrete step occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStep {
    /// Resolved step id, if a generated instance matched.
    pub step_id: Option<String>,
    /// Concrete step text from the generated instance.
    pub text: Option<String>,
    /// Normalized outcome; empty status when none was recorded.
    pub result: StepResult,
    /// Attachments in encounter order.
    pub embeddings: Vec<Embedding>,
    /// Definition location.
    pub step_match: StepMatch,
}

/// Joins generated instances, executed cases, outcomes, definitions and
/// attachments for the steps of one event stream.
#[derive(Debug)]
pub struct Correlator<'a> {
    pickles: Vec<&'a Pickle>,
    /// template step id → (pickle position, step position), one per instance.
    occurrences: HashMap<&'a str, Vec<(usize, usize)>>,
    /// scenario id → pickle positions.
    instances: HashMap<&'a str, Vec<usize>>,
    pickle_steps: HashMap<&'a str, &'a PickleStep>,
    /// resolved step id → executed test step.
    test_steps: HashMap<&'a str, &'a TestStep>,
    definitions: HashMap<&'a str, &'a StepDefinition>,
    /// referenced step id → last outcome.
    outcomes: HashMap<&'a str, &'a TestStepFinished>,
    attachments: Vec<&'a Attachment>,
    /// referenced step id → attachment positions.
    attachments_by_step: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Correlator<'a> {
    /// Builds the join indices for `index`.
    #[must_use]
    pub fn new(index: &'a EventIndex) -> Self {
        let pickles: Vec<&Pickle> = index.pickles().collect();

        let mut occurrences: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
        let mut instances: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut pickle_steps = HashMap::new();
        for (pickle_pos, &pickle) in pickles.iter().enumerate() {
            if let Some(scenario_id) = pickle.scenario_id() {
                instances.entry(scenario_id).or_default().push(pickle_pos);
            }
            for (step_pos, step) in pickle.steps.iter().enumerate() {
                pickle_steps.entry(step.id.as_str()).or_insert(step);
                if let Some(template_id) = step.template_id() {
                    let list = occurrences.entry(template_id).or_default();
                    // One occurrence per instance, first matching step wins.
                    if list.last().is_none_or(|&(last, _)| last != pickle_pos) {
                        list.push((pickle_pos, step_pos));
                    }
                }
            }
        }

        let mut test_steps = HashMap::new();
        for case in index.test_cases() {
            for step in &case.test_steps {
                if let Some(pickle_step_id) = step.pickle_step_id.as_deref() {
                    test_steps.entry(pickle_step_id).or_insert(step);
                }
            }
        }

        let mut definitions = HashMap::new();
        for def in index.step_definitions() {
            definitions.entry(def.id.as_str()).or_insert(def);
        }

        let mut outcomes = HashMap::new();
        for finished in index.outcomes() {
            outcomes.insert(finished.test_step_id.as_str(), finished);
        }

        let attachments: Vec<&Attachment> = index.attachments().collect();
        let mut attachments_by_step: HashMap<&str, Vec<usize>> = HashMap::new();
        for (pos, attachment) in attachments.iter().enumerate() {
            if let Some(step_id) = attachment.test_step_id.as_deref() {
                attachments_by_step.entry(step_id).or_default().push(pos);
            }
        }

        Self {
            pickles,
            occurrences,
            instances,
            pickle_steps,
            test_steps,
            definitions,
            outcomes,
            attachments,
            attachments_by_step,
        }
    }

    /// Number of generated instances containing `template_step_id`.
    #[must_use]
    pub fn occurrence_count(&self, template_step_id: &str) -> usize {
        self.occurrences.get(template_step_id).map_or(0, Vec::len)
    }

    /// Resolved step id of the `instance_index`-th instance containing
    /// `template_step_id`.
    #[must_use]
    pub fn resolve_step_id(&self, template_step_id: &str, instance_index: usize) -> Option<&'a str> {
        let &(pickle_pos, step_pos) = self
            .occurrences
            .get(template_step_id)?
            .get(instance_index)?;
        let pickle: &'a Pickle = self.pickles[pickle_pos];
        Some(pickle.steps[step_pos].id.as_str())
    }

    /// Resolves text, outcome, attachments and match for one template step
    /// occurrence. Lookup misses yield defaults, never errors.
    #[must_use]
    pub fn resolve_step(&self, template_step_id: &str, instance_index: usize) -> ResolvedStep {
        self.resolve_concrete(self.resolve_step_id(template_step_id, instance_index))
    }

    /// The `instance_index`-th generated instance of a scenario.
    #[must_use]
    pub fn instance_for(&self, scenario_id: &str, instance_index: usize) -> Option<&'a Pickle> {
        let &pos = self.instances.get(scenario_id)?.get(instance_index)?;
        Some(self.pickles[pos])
    }

    /// Resolves `template_step_id` inside a known generated instance.
    #[must_use]
    pub fn resolve_in_instance(&self, instance: &Pickle, template_step_id: &str) -> ResolvedStep {
        let step_id = instance
            .steps
            .iter()
            .find(|step| step.template_id() == Some(template_step_id))
            .map(|step| step.id.as_str());
        self.resolve_concrete(step_id)
    }

    /// Literal text of a resolved step.
    #[must_use]
    pub fn step_text(&self, step_id: &str) -> Option<&'a str> {
        self.pickle_steps.get(step_id).map(|&step| step.text.as_str())
    }

    /// Normalized outcome of a resolved step.
    #[must_use]
    pub fn outcome(&self, step_id: &str) -> StepResult {
        let Some(finished) = self
            .reference_keys(step_id)
            .into_iter()
            .flatten()
            .find_map(|key| self.outcomes.get(key))
        else {
            return StepResult::default();
        };
        let result = &finished.test_step_result;
        StepResult {
            status: result.status.to_lowercase(),
            duration: result.duration.map_or(0, |d| d.as_nanos()),
            error_message: result.message.clone(),
        }
    }

    /// Location of the first definition matched by a resolved step.
    #[must_use]
    pub fn step_match(&self, step_id: &str) -> StepMatch {
        let location = self
            .test_steps
            .get(step_id)
            .and_then(|step| step.step_definition_ids.first())
            .and_then(|def_id| self.definitions.get(def_id.as_str()))
            .and_then(|def| {
                let source = &def.source_reference;
                Some((source.uri.as_deref()?, source.location?.line))
            });
        match location {
            Some((uri, line)) => StepMatch::at(uri, line),
            None => StepMatch::unmatched(),
        }
    }

    /// Attachments referencing a resolved step, in encounter order.
    #[must_use]
    pub fn attachments(&self, step_id: &str) -> Vec<Embedding> {
        let mut positions: Vec<usize> = self
            .reference_keys(step_id)
            .into_iter()
            .flatten()
            .filter_map(|key| self.attachments_by_step.get(key))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
            .into_iter()
            .map(|pos| {
                let attachment = self.attachments[pos];
                Embedding {
                    data: attachment.body.clone(),
                    mime_type: attachment.media_type.clone(),
                    content_encoding: attachment.content_encoding.clone(),
                }
            })
            .collect()
    }

    fn resolve_concrete(&self, step_id: Option<&str>) -> ResolvedStep {
        let Some(step_id) = step_id else {
            return ResolvedStep::default();
        };
        ResolvedStep {
            step_id: Some(step_id.to_string()),
            text: self.step_text(step_id).map(str::to_string),
            result: self.outcome(step_id),
            embeddings: self.attachments(step_id),
            step_match: self.step_match(step_id),
        }
    }

    /// Ids an outcome or attachment may use to reference a resolved step:
    /// the executed test step's id, then the resolved step id itself.
    fn reference_keys<'k>(&self, step_id: &'k str) -> [Option<&'k str>; 2]
    where
        'a: 'k,
    {
        let test_step_id = self.test_steps.get(step_id).map(|&step| step.id.as_str());
        let own = if test_step_id == Some(step_id) {
            None
        } else {
            Some(step_id)
        };
        [test_step_id, own]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(lines: &[&str]) -> EventIndex {
        EventIndex::from_lines(lines.iter().copied())
    }

    /// Two instances of one outline sharing template step `st1`.
    fn outline_stream() -> EventIndex {
        index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1","r1"],"steps":[{"id":"ps1","text":"login as alice","astNodeIds":["st1","r1"]}]}}"#,
            r#"{"pickle":{"id":"p2","astNodeIds":["s1","r2"],"steps":[{"id":"ps2","text":"login as bob","astNodeIds":["st1","r2"]}]}}"#,
            r#"{"testCase":{"id":"tc1","pickleId":"p1","testSteps":[{"id":"ts1","pickleStepId":"ps1","stepDefinitionIds":["d1"]}]}}"#,
            r#"{"testCase":{"id":"tc2","pickleId":"p2","testSteps":[{"id":"ts2","pickleStepId":"ps2","stepDefinitionIds":["d1"]}]}}"#,
            r#"{"stepDefinition":{"id":"d1","sourceReference":{"uri":"steps/login.rs","location":{"line":14}}}}"#,
            r#"{"testStepFinished":{"testStepId":"ts1","testStepResult":{"status":"PASSED","duration":{"seconds":1,"nanos":5}}}}"#,
            r#"{"testStepFinished":{"testStepId":"ts2","testStepResult":{"status":"FAILED","message":"boom","duration":{"seconds":0,"nanos":9}}}}"#,
            r#"{"attachment":{"testStepId":"ts2","body":"shot","mediaType":"image/png","contentEncoding":"BASE64"}}"#,
            r#"{"attachment":{"testStepId":"ts2","body":"log","mediaType":"text/plain","contentEncoding":"IDENTITY"}}"#,
        ])
    }

    #[test]
    fn nth_instance_is_selected_positionally() {
        let idx = outline_stream();
        let correlator = Correlator::new(&idx);
        assert_eq!(correlator.occurrence_count("st1"), 2);
        assert_eq!(correlator.resolve_step_id("st1", 0), Some("ps1"));
        assert_eq!(correlator.resolve_step_id("st1", 1), Some("ps2"));
        assert_eq!(correlator.resolve_step_id("st1", 2), None);
    }

    #[test]
    fn resolves_full_chain() {
        let idx = outline_stream();
        let correlator = Correlator::new(&idx);

        let first = correlator.resolve_step("st1", 0);
        assert_eq!(first.text.as_deref(), Some("login as alice"));
        assert_eq!(first.result.status, "passed");
        assert_eq!(first.result.duration, 1_000_000_005);
        assert_eq!(first.result.error_message, None);
        assert_eq!(first.step_match.location, "steps/login.rs:14");
        assert!(first.embeddings.is_empty());

        let second = correlator.resolve_step("st1", 1);
        assert_eq!(second.result.status, "failed");
        assert_eq!(second.result.error_message.as_deref(), Some("boom"));
        let bodies: Vec<_> = second.embeddings.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(bodies, ["shot", "log"]);
        assert_eq!(second.embeddings[0].mime_type, "image/png");
        assert_eq!(second.embeddings[0].content_encoding, "BASE64");
    }

    #[test]
    fn misses_yield_defaults() {
        let idx = index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1"],"steps":[{"id":"ps1","text":"orphan","astNodeIds":["st1"]}]}}"#,
        ]);
        let correlator = Correlator::new(&idx);
        let resolved = correlator.resolve_step("st1", 0);
        assert_eq!(resolved.text.as_deref(), Some("orphan"));
        assert_eq!(resolved.result, StepResult::default());
        assert!(resolved.step_match.is_unmatched());
        assert!(resolved.embeddings.is_empty());

        let unknown = correlator.resolve_step("nope", 0);
        assert_eq!(unknown, ResolvedStep::default());
    }

    #[test]
    fn outcome_may_reference_resolved_step_directly() {
        let idx = index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1"],"steps":[{"id":"ps1","text":"x","astNodeIds":["st1"]}]}}"#,
            r#"{"testStepFinished":{"testStepId":"ps1","testStepResult":{"status":"Skipped"}}}"#,
            r#"{"attachment":{"testStepId":"ps1","body":"b","mediaType":"text/plain","contentEncoding":"IDENTITY"}}"#,
        ]);
        let correlator = Correlator::new(&idx);
        let resolved = correlator.resolve_step("st1", 0);
        assert_eq!(resolved.result.status, "skipped");
        assert_eq!(resolved.result.duration, 0);
        assert_eq!(resolved.embeddings.len(), 1);
    }

    #[test]
    fn ids_that_are_prefixes_do_not_collide() {
        let idx = index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1"],"steps":[{"id":"ps1","text":"one","astNodeIds":["st1"]}]}}"#,
            r#"{"pickle":{"id":"p2","astNodeIds":["s10"],"steps":[{"id":"ps10","text":"ten","astNodeIds":["st10"]}]}}"#,
            r#"{"testStepFinished":{"testStepId":"ps10","testStepResult":{"status":"PASSED"}}}"#,
        ]);
        let correlator = Correlator::new(&idx);
        assert_eq!(correlator.occurrence_count("st1"), 1);
        assert_eq!(correlator.resolve_step("st1", 0).result.status, "");
        assert_eq!(correlator.resolve_step("st10", 0).result.status, "passed");
    }

    #[test]
    fn last_outcome_wins_for_retried_step() {
        let idx = index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1"],"steps":[{"id":"ps1","text":"x","astNodeIds":["st1"]}]}}"#,
            r#"{"testCase":{"id":"tc1","pickleId":"p1","testSteps":[{"id":"ts1","pickleStepId":"ps1"}]}}"#,
            r#"{"testStepFinished":{"testStepId":"ts1","testStepResult":{"status":"FAILED"}}}"#,
            r#"{"testStepFinished":{"testStepId":"ts1","testStepResult":{"status":"PASSED"}}}"#,
        ]);
        let correlator = Correlator::new(&idx);
        let resolved = correlator.resolve_step("st1", 0);
        assert_eq!(resolved.result.status, "passed");
        assert!(resolved.step_match.is_unmatched());
    }

    #[test]
    fn background_steps_resolve_within_their_instance() {
        let idx = index(&[
            r#"{"pickle":{"id":"p1","astNodeIds":["s1"],"steps":[{"id":"b-a","text":"bg","astNodeIds":["bg1"]},{"id":"x-a","text":"first","astNodeIds":["st1"]}]}}"#,
            r#"{"pickle":{"id":"p2","astNodeIds":["s2"],"steps":[{"id":"b-b","text":"bg","astNodeIds":["bg1"]},{"id":"x-b","text":"second","astNodeIds":["st2"]}]}}"#,
        ]);
        let correlator = Correlator::new(&idx);
        let instance = correlator.instance_for("s2", 0).unwrap();
        assert_eq!(instance.id, "p2");
        let resolved = correlator.resolve_in_instance(instance, "bg1");
        assert_eq!(resolved.step_id.as_deref(), Some("b-b"));
        assert!(correlator.instance_for("s2", 1).is_none());
    }
}
