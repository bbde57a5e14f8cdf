//! Output document shape.
//!
//! Field order here is the serialized field order.

use serde::{Deserialize, Serialize};

/// Location reported for a step with no matching definition.
pub const UNMATCHED_LOCATION: &str = "undefined:undefined";

/// One feature-level report document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Comments of the feature file.
    pub comments: Vec<CommentReport>,
    /// Feature description.
    pub description: String,
    /// Backgrounds and scenario instances in emission order.
    pub elements: Vec<ElementReport>,
    /// Feature name.
    pub id: String,
    /// Feature keyword.
    pub keyword: String,
    /// Line of the feature keyword.
    pub line: u32,
    /// Feature name.
    pub name: String,
    /// Source URI.
    pub uri: String,
    /// Feature tags.
    pub tags: Vec<TagReport>,
}

/// A comment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReport {
    /// Line of the comment.
    pub line: u32,
    /// Raw comment text.
    pub value: String,
}

/// A tag, name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReport {
    /// Tag text including `@`.
    pub name: String,
}

/// Kind of element node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Shared precondition block.
    Background,
    /// One scenario instance.
    Scenario,
}

/// A background or scenario instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementReport {
    /// Element description.
    pub description: String,
    /// `feature;scenario` or `feature;rule;scenario`.
    pub id: String,
    /// Element keyword.
    pub keyword: String,
    /// Line of the element keyword.
    pub line: u32,
    /// Name after placeholder substitution.
    pub name: String,
    /// Fully resolved steps in document order.
    pub steps: Vec<StepReport>,
    /// Element tags.
    pub tags: Vec<TagReport>,
    /// Background or scenario.
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

/// A resolved step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step keyword.
    pub keyword: String,
    /// Line of the step.
    pub line: u32,
    /// Concrete step text.
    pub name: String,
    /// Execution outcome.
    pub result: StepResult,
    /// Attachments in encounter order.
    pub embeddings: Vec<Embedding>,
    /// Definition location.
    #[serde(rename = "match")]
    pub step_match: StepMatch,
}

/// Normalized outcome of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Lower-cased status; empty when no outcome was recorded.
    pub status: String,
    /// Duration in nanoseconds.
    pub duration: u64,
    /// Error message, `null` when absent.
    pub error_message: Option<String>,
}

impl StepResult {
    /// Returns `true` when no outcome event was found for the step.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.status.is_empty()
    }
}

/// An attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embedding {
    /// Encoded payload.
    pub data: String,
    /// Media type.
    pub mime_type: String,
    /// Payload encoding.
    #[serde(rename = "contentEncoding")]
    pub content_encoding: String,
}

/// Where the matched step definition lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMatch {
    /// `<uri>:<line>`, or [`UNMATCHED_LOCATION`].
    pub location: String,
}

impl StepMatch {
    /// A match at `uri:line`.
    #[must_use]
    pub fn at(uri: &str, line: u32) -> Self {
        Self {
            location: format!("{uri}:{line}"),
        }
    }

    /// The placeholder for a step without a definition.
    #[must_use]
    pub fn unmatched() -> Self {
        Self {
            location: UNMATCHED_LOCATION.to_string(),
        }
    }

    /// Returns `true` if no definition was found.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.location == UNMATCHED_LOCATION
    }
}

impl Default for StepMatch {
    fn default() -> Self {
        Self::unmatched()
    }
}
