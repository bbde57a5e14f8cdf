//! Typed records for the input event stream.
//!
//! Each input line is one JSON object whose single top-level key names the
//! event category (`{"pickle": {...}}`). Lines are decoded into [`Event`]
//! values; keys this crate does not correlate decode to [`Event::Other`].

pub mod execution;
pub mod gherkin;

pub use execution::{
    Attachment, Duration, Pickle, PickleStep, SourceReference, StepDefinition, TestCase,
    TestStep, TestStepFinished, TestStepResult,
};
pub use gherkin::{
    Background, Comment, Examples, Feature, FeatureChild, GherkinDocument, Location, Rule,
    RuleChild, Scenario, Step, TableCell, TableRow, Tag,
};

use core::fmt;
use serde_json::Value;

/// Category of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventCategory {
    /// Parsed Gherkin document.
    Document,
    /// Generated scenario instance.
    Pickle,
    /// Executed test case.
    TestCase,
    /// Step-level outcome.
    TestStepFinished,
    /// Step definition (glue location).
    StepDefinition,
    /// Attachment produced by a step.
    Attachment,
    /// Anything else (`meta`, `source`, run lifecycle, hooks).
    Other,
}

impl EventCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Document,
        Self::Pickle,
        Self::TestCase,
        Self::TestStepFinished,
        Self::StepDefinition,
        Self::Attachment,
        Self::Other,
    ];

    /// Maps an envelope key to its category.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "gherkinDocument" => Self::Document,
            "pickle" => Self::Pickle,
            "testCase" => Self::TestCase,
            "testStepFinished" => Self::TestStepFinished,
            "stepDefinition" => Self::StepDefinition,
            "attachment" => Self::Attachment,
            _ => Self::Other,
        }
    }

    /// The envelope key of this category; `None` for [`EventCategory::Other`].
    #[must_use]
    pub const fn key(self) -> Option<&'static str> {
        match self {
            Self::Document => Some("gherkinDocument"),
            Self::Pickle => Some("pickle"),
            Self::TestCase => Some("testCase"),
            Self::TestStepFinished => Some("testStepFinished"),
            Self::StepDefinition => Some("stepDefinition"),
            Self::Attachment => Some("attachment"),
            Self::Other => None,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or("other"))
    }
}

/// A decoded input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `gherkinDocument`
    Document(GherkinDocument),
    /// `pickle`
    Pickle(Pickle),
    /// `testCase`
    TestCase(TestCase),
    /// `testStepFinished`
    TestStepFinished(TestStepFinished),
    /// `stepDefinition`
    StepDefinition(StepDefinition),
    /// `attachment`
    Attachment(Attachment),
    /// Any other envelope, keyed by its top-level key.
    Other(String),
}

impl Event {
    /// The category this event belongs to.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::Document(_) => EventCategory::Document,
            Self::Pickle(_) => EventCategory::Pickle,
            Self::TestCase(_) => EventCategory::TestCase,
            Self::TestStepFinished(_) => EventCategory::TestStepFinished,
            Self::StepDefinition(_) => EventCategory::StepDefinition,
            Self::Attachment(_) => EventCategory::Attachment,
            Self::Other(_) => EventCategory::Other,
        }
    }

    /// Decodes one serialized envelope.
    ///
    /// Returns a human-readable reason on failure; the caller attaches the
    /// line number and raw text.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        let Value::Object(mut envelope) = value else {
            return Err("event is not a JSON object".to_string());
        };
        let Some(key) = envelope.keys().next().cloned() else {
            return Err("event object is empty".to_string());
        };
        let category = EventCategory::from_key(&key);
        if category == EventCategory::Other {
            return Ok(Self::Other(key));
        }
        let payload = envelope.remove(&key).unwrap_or(Value::Null);
        let decoded = match category {
            EventCategory::Document => serde_json::from_value(payload).map(Self::Document),
            EventCategory::Pickle => serde_json::from_value(payload).map(Self::Pickle),
            EventCategory::TestCase => serde_json::from_value(payload).map(Self::TestCase),
            EventCategory::TestStepFinished => {
                serde_json::from_value(payload).map(Self::TestStepFinished)
            }
            EventCategory::StepDefinition => {
                serde_json::from_value(payload).map(Self::StepDefinition)
            }
            EventCategory::Attachment => serde_json::from_value(payload).map(Self::Attachment),
            EventCategory::Other => Ok(Self::Other(key.clone())),
        };
        decoded.map_err(|e| format!("invalid {key} payload: {e}"))
    }
}
