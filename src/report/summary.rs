//! Status counters over an assembled report.

use crate::report::model::{ElementType, FeatureReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label used for steps that have no recorded outcome.
pub const MISSING_STATUS: &str = "missing";

/// Deterministic counts of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Feature documents.
    pub features: usize,
    /// Scenario instances (backgrounds excluded).
    pub scenarios: usize,
    /// Steps across scenarios and backgrounds.
    pub steps: usize,
    /// Steps per normalized status.
    pub statuses: BTreeMap<String, usize>,
    /// Sum of step durations in nanoseconds.
    pub total_duration_nanos: u64,
}

impl ReportSummary {
    /// Tallies `features`.
    #[must_use]
    pub fn from_features(features: &[FeatureReport]) -> Self {
        let mut summary = Self {
            features: features.len(),
            ..Self::default()
        };
        for element in features.iter().flat_map(|f| &f.elements) {
            if element.element_type == ElementType::Scenario {
                summary.scenarios += 1;
            }
            for step in &element.steps {
                summary.steps += 1;
                summary.total_duration_nanos = summary
                    .total_duration_nanos
                    .saturating_add(step.result.duration);
                let status = if step.result.is_missing() {
                    MISSING_STATUS
                } else {
                    step.result.status.as_str()
                };
                *summary.statuses.entry(status.to_string()).or_default() += 1;
            }
        }
        summary
    }

    /// Number of steps with `status`.
    #[must_use]
    pub fn count(&self, status: &str) -> usize {
        self.statuses.get(status).copied().unwrap_or(0)
    }

    /// Multi-line human-readable rendering.
    #[must_use]
    pub fn human_format(&self) -> String {
        let mut lines = vec![
            format!("Features: {}", self.features),
            format!("Scenarios: {}", self.scenarios),
            format!("Steps: {}", self.steps),
        ];
        for (status, count) in &self.statuses {
            lines.push(format!("  {status}: {count}"));
        }
        #[allow(clippy::cast_precision_loss)]
        let secs = self.total_duration_nanos as f64 / 1e9;
        lines.push(format!("Duration: {secs:.3}s"));
        lines.join("\n")
    }
}
