//! Document traversal and element assembly.
//!
//! Walks a feature in document order. Rules flatten into the feature with
//! their name prefixed into element ids. The pending background travels
//! through the traversal as an explicit value and is re-emitted, resolved
//! against the right generated instance, in front of every scenario
//! instance that follows it.

use crate::correlate::{Correlator, ResolvedStep};
use crate::error::{Result, StructureError, StructureErrorKind};
use crate::messages::{Background, Feature, FeatureChild, RuleChild, Scenario, Step, Tag};
use crate::report::model::{ElementReport, ElementType, StepReport, TagReport};
use crate::tracing_compat::{debug, warn};

/// Replaces every `<header>` token in `template` with its row value.
///
/// Templates without both `<` and `>` are returned unchanged.
#[must_use]
pub fn substitute_placeholders(template: &str, row: &[(&str, &str)]) -> String {
    if !(template.contains('<') && template.contains('>')) {
        return template.to_string();
    }
    row.iter().fold(template.to_string(), |text, (header, value)| {
        text.replace(&format!("<{header}>"), value)
    })
}

pub(crate) fn tag_reports(tags: &[Tag]) -> Vec<TagReport> {
    tags.iter()
        .map(|tag| TagReport {
            name: tag.name.clone(),
        })
        .collect()
}

/// Identifier prefix of the elements being built.
#[derive(Debug, Clone, Copy)]
struct Scope<'d> {
    feature: &'d str,
    rule: Option<&'d str>,
}

impl Scope<'_> {
    fn element_id(&self, name: &str) -> String {
        match self.rule {
            Some(rule) => format!("{};{rule};{name}", self.feature),
            None => format!("{};{name}", self.feature),
        }
    }
}

/// Background carried forward to the scenarios that follow it.
#[derive(Debug, Clone)]
struct PendingBackground<'d> {
    keyword: &'d str,
    name: &'d str,
    description: &'d str,
    line: u32,
    steps: Vec<&'d Step>,
}

impl<'d> PendingBackground<'d> {
    fn new(background: &'d Background) -> Self {
        Self {
            keyword: &background.keyword,
            name: &background.name,
            description: &background.description,
            line: background.location.line,
            steps: background.steps.iter().collect(),
        }
    }

    /// A rule background runs after the feature background it inherits.
    fn extended_by(inherited: Option<&Self>, background: &'d Background) -> Self {
        let mut merged = Self::new(background);
        if let Some(outer) = inherited {
            merged.steps = outer.steps.iter().copied().chain(merged.steps).collect();
        }
        merged
    }
}

/// One scenario instance to emit.
#[derive(Debug, Clone)]
struct Instance<'d> {
    /// Position among the scenario's generated instances.
    index: usize,
    /// Header/value pairs of the examples row, empty for plain scenarios.
    row: Vec<(&'d str, &'d str)>,
}

/// Assembles report elements for features, querying a [`Correlator`] for
/// every step occurrence.
#[derive(Debug)]
pub struct TreeBuilder<'c, 'a> {
    correlator: &'c Correlator<'a>,
    strict: bool,
    expand_all_examples: bool,
}

impl<'c, 'a> TreeBuilder<'c, 'a> {
    /// Creates a lenient builder that expands the first examples table only.
    #[must_use]
    pub fn new(correlator: &'c Correlator<'a>) -> Self {
        Self {
            correlator,
            strict: false,
            expand_all_examples: false,
        }
    }

    /// Report structural inconsistencies as errors instead of skipping.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Expand every examples table of a templated scenario.
    #[must_use]
    pub fn with_expand_all_examples(mut self, expand: bool) -> Self {
        self.expand_all_examples = expand;
        self
    }

    /// Builds the element list of one feature.
    pub fn build(&self, feature: &Feature) -> Result<Vec<ElementReport>> {
        let scope = Scope {
            feature: &feature.name,
            rule: None,
        };
        let mut elements = Vec::new();
        let mut pending: Option<PendingBackground<'_>> = None;
        for child in &feature.children {
            match child {
                FeatureChild::Background(background) => {
                    pending = Some(PendingBackground::new(background));
                }
                FeatureChild::Scenario(scenario) => {
                    self.build_scenario(scope, scenario, pending.as_ref(), &mut elements)?;
                }
                FeatureChild::Rule(rule) => {
                    let rule_scope = Scope {
                        rule: Some(&rule.name),
                        ..scope
                    };
                    self.build_rule(rule_scope, &rule.children, pending.as_ref(), &mut elements)?;
                }
            }
        }
        debug!(
            feature = %feature.name,
            elements = elements.len(),
            "feature elements assembled"
        );
        Ok(elements)
    }

    fn build_rule(
        &self,
        scope: Scope<'_>,
        children: &[RuleChild],
        inherited: Option<&PendingBackground<'_>>,
        elements: &mut Vec<ElementReport>,
    ) -> Result<()> {
        let mut pending = inherited.cloned();
        for child in children {
            match child {
                RuleChild::Background(background) => {
                    pending = Some(PendingBackground::extended_by(inherited, background));
                }
                RuleChild::Scenario(scenario) => {
                    self.build_scenario(scope, scenario, pending.as_ref(), elements)?;
                }
            }
        }
        Ok(())
    }

    fn build_scenario(
        &self,
        scope: Scope<'_>,
        scenario: &Scenario,
        background: Option<&PendingBackground<'_>>,
        elements: &mut Vec<ElementReport>,
    ) -> Result<()> {
        let instances = if scenario.is_templated() {
            match self.examples_instances(scenario) {
                Ok(instances) => instances,
                Err(kind) => return self.structural_skip(scope, scenario, kind),
            }
        } else {
            vec![Instance {
                index: 0,
                row: Vec::new(),
            }]
        };

        for instance in &instances {
            if let Some(background) = background.filter(|bg| !bg.steps.is_empty()) {
                elements.push(self.background_element(scope, background, scenario, instance));
            }
            elements.push(self.scenario_element(scope, scenario, instance));
        }
        Ok(())
    }

    /// One instance per examples row, indexed across the expanded tables.
    fn examples_instances<'d>(
        &self,
        scenario: &'d Scenario,
    ) -> std::result::Result<Vec<Instance<'d>>, StructureErrorKind> {
        if scenario.examples.is_empty() {
            return Err(StructureErrorKind::MissingExamples);
        }
        let tables = if self.expand_all_examples {
            &scenario.examples[..]
        } else {
            &scenario.examples[..1]
        };

        let mut instances = Vec::new();
        for table in tables {
            let body = table
                .table_body
                .as_ref()
                .ok_or(StructureErrorKind::MissingTableBody)?;
            let header = match table.table_header.as_ref() {
                Some(header) => &header.cells[..],
                None if body.is_empty() => continue,
                None => return Err(StructureErrorKind::MissingTableHeader),
            };
            for row in body {
                if row.cells.len() < header.len() {
                    return Err(StructureErrorKind::ShortExamplesRow);
                }
                let pairs = header
                    .iter()
                    .zip(&row.cells)
                    .map(|(h, v)| (h.value.as_str(), v.value.as_str()))
                    .collect();
                instances.push(Instance {
                    index: instances.len(),
                    row: pairs,
                });
            }
        }
        Ok(instances)
    }

    fn structural_skip(
        &self,
        scope: Scope<'_>,
        scenario: &Scenario,
        kind: StructureErrorKind,
    ) -> Result<()> {
        let err = StructureError {
            kind,
            scenario: scope.element_id(&scenario.name),
            line: scenario.location.line,
        };
        if self.strict {
            return Err(err.into());
        }
        warn!(
            scenario = %err.scenario,
            line = err.line,
            reason = kind.as_str(),
            "skipping structurally inconsistent scenario"
        );
        Ok(())
    }

    fn scenario_element(
        &self,
        scope: Scope<'_>,
        scenario: &Scenario,
        instance: &Instance<'_>,
    ) -> ElementReport {
        let name = substitute_placeholders(&scenario.name, &instance.row);
        let steps = scenario
            .steps
            .iter()
            .map(|step| {
                let resolved = self.correlator.resolve_step(&step.id, instance.index);
                step_report(step, resolved, &instance.row)
            })
            .collect();
        ElementReport {
            description: scenario.description.clone(),
            id: scope.element_id(&name),
            keyword: scenario.keyword.clone(),
            line: scenario.location.line,
            name,
            steps,
            tags: tag_reports(&scenario.tags),
            element_type: ElementType::Scenario,
        }
    }

    /// Background steps resolve inside the generated instance of the
    /// scenario they precede.
    fn background_element(
        &self,
        scope: Scope<'_>,
        background: &PendingBackground<'_>,
        scenario: &Scenario,
        instance: &Instance<'_>,
    ) -> ElementReport {
        let generated = self.correlator.instance_for(&scenario.id, instance.index);
        let steps = background
            .steps
            .iter()
            .map(|step| {
                let resolved = generated
                    .map(|pickle| self.correlator.resolve_in_instance(pickle, &step.id))
                    .unwrap_or_default();
                step_report(step, resolved, &[])
            })
            .collect();
        ElementReport {
            description: background.description.to_string(),
            id: scope.element_id(background.name),
            keyword: background.keyword.to_string(),
            line: background.line,
            name: background.name.to_string(),
            steps,
            tags: Vec::new(),
            element_type: ElementType::Background,
        }
    }
}

fn step_report(step: &Step, resolved: ResolvedStep, row: &[(&str, &str)]) -> StepReport {
    StepReport {
        keyword: step.keyword.clone(),
        line: step.location.line,
        name: resolved
            .text
            .unwrap_or_else(|| substitute_placeholders(&step.text, row)),
        result: resolved.result,
        embeddings: resolved.embeddings,
        step_match: resolved.step_match,
    }
}
