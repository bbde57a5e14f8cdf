//! Category-scoped index over the raw event stream.
//!
//! Built once per conversion. Events keep their input order inside every
//! category. A line that cannot be decoded is logged, recorded as a
//! [`MalformedEventError`] and skipped; the rest of the stream is still
//! indexed.

use crate::error::MalformedEventError;
use crate::messages::{
    Attachment, Event, EventCategory, GherkinDocument, Pickle, StepDefinition, TestCase,
    TestStepFinished,
};
use crate::tracing_compat::{debug, error};

/// Decoded events of one input stream, grouped by category on demand.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    events: Vec<Event>,
    malformed: Vec<MalformedEventError>,
}

impl EventIndex {
    /// Decodes every line of the stream. Blank lines are ignored.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for (offset, line) in lines.into_iter().enumerate() {
            let raw = line.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match Event::parse(raw) {
                Ok(event) => index.events.push(event),
                Err(reason) => {
                    let err = MalformedEventError::new(offset + 1, raw, reason);
                    error!(
                        line = err.line,
                        raw = %err.raw,
                        reason = %err.reason,
                        "skipping malformed event"
                    );
                    index.malformed.push(err);
                }
            }
        }
        debug!(
            events = index.events.len(),
            malformed = index.malformed.len(),
            "event index built"
        );
        index
    }

    /// All decoded events in input order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Lines that were skipped because they could not be decoded.
    #[must_use]
    pub fn malformed(&self) -> &[MalformedEventError] {
        &self.malformed
    }

    /// Number of decoded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no event was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Ordered subset of events belonging to `category`.
    pub fn category(&self, category: EventCategory) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(move |event| event.category() == category)
    }

    /// Number of events in `category`.
    #[must_use]
    pub fn count(&self, category: EventCategory) -> usize {
        self.category(category).count()
    }

    /// Document structures in input order.
    pub fn documents(&self) -> impl Iterator<Item = &GherkinDocument> {
        self.events.iter().filter_map(|event| match event {
            Event::Document(doc) => Some(doc),
            _ => None,
        })
    }

    /// Generated instances in input order.
    pub fn pickles(&self) -> impl Iterator<Item = &Pickle> {
        self.events.iter().filter_map(|event| match event {
            Event::Pickle(pickle) => Some(pickle),
            _ => None,
        })
    }

    /// Executed cases in input order.
    pub fn test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.events.iter().filter_map(|event| match event {
            Event::TestCase(case) => Some(case),
            _ => None,
        })
    }

    /// Step outcomes in input order.
    pub fn outcomes(&self) -> impl Iterator<Item = &TestStepFinished> {
        self.events.iter().filter_map(|event| match event {
            Event::TestStepFinished(finished) => Some(finished),
            _ => None,
        })
    }

    /// Step definitions in input order.
    pub fn step_definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.events.iter().filter_map(|event| match event {
            Event::StepDefinition(def) => Some(def),
            _ => None,
        })
    }

    /// Attachments in input order.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.events.iter().filter_map(|event| match event {
            Event::Attachment(attachment) => Some(attachment),
            _ => None,
        })
    }
}
