//! In-memory wire variant: a writer that records events and a reader that
//! replays them.
//!
//! Useful for tests and for inspecting exactly what a codec emits, including
//! the namespace that was active for every event.

use core::convert::Infallible;
use std::borrow::Cow;
use std::collections::VecDeque;

use crate::tracing_macros::trace;
use crate::{ScalarValue, WireContext, WireEvent, WireKind, WireOptions, WireReader, WireWriter};

/// An event together with the namespace that was active when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// The event.
    pub event: WireEvent<'static>,
    /// Active namespace, `None` for the default namespace.
    pub namespace: Option<String>,
}

/// Writer that records every event in memory.
#[derive(Debug, Default)]
pub struct EventWriter {
    events: Vec<RecordedEvent>,
    context: WireContext,
}

impl EventWriter {
    /// Create an empty writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with the given options.
    pub fn with_options(options: WireOptions) -> Self {
        Self {
            events: Vec::new(),
            context: WireContext::with_options(options),
        }
    }

    /// Events recorded so far.
    pub fn recorded(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consume the writer, returning events with their namespaces.
    pub fn into_recorded(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Consume the writer, returning the bare events.
    pub fn into_events(self) -> Vec<WireEvent<'static>> {
        self.events.into_iter().map(|r| r.event).collect()
    }

    fn record(&mut self, event: WireEvent<'static>) -> Result<(), Infallible> {
        let namespace = self.context.namespace().map(String::from);
        trace!(%event, ?namespace, "record");
        self.events.push(RecordedEvent { event, namespace });
        Ok(())
    }
}

fn owned(name: &str) -> Cow<'static, str> {
    Cow::Owned(String::from(name))
}

impl WireWriter for EventWriter {
    type Error = Infallible;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn begin_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.record(WireEvent::StructBegin(owned(name)))
    }

    fn end_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.record(WireEvent::StructEnd(owned(name)))
    }

    fn begin_sequence(&mut self, name: &str, len: usize) -> Result<(), Self::Error> {
        self.record(WireEvent::SequenceBegin {
            name: owned(name),
            len: Some(len),
        })
    }

    fn end_sequence(&mut self, name: &str) -> Result<(), Self::Error> {
        self.record(WireEvent::SequenceEnd(owned(name)))
    }

    fn scalar(&mut self, name: &str, value: ScalarValue<'_>) -> Result<(), Self::Error> {
        self.record(WireEvent::Scalar {
            name: owned(name),
            value: value.into_owned(),
        })
    }

    fn absent(&mut self, name: &str) -> Result<(), Self::Error> {
        self.record(WireEvent::Absent(owned(name)))
    }

    fn present(&mut self, name: &str) -> Result<(), Self::Error> {
        self.record(WireEvent::Present(owned(name)))
    }
}

/// Reader that replays a list of events.
#[derive(Debug)]
pub struct EventReader<'de> {
    events: VecDeque<WireEvent<'de>>,
    context: WireContext,
}

impl<'de> EventReader<'de> {
    /// Replay `events` with default options.
    pub fn new(events: impl IntoIterator<Item = WireEvent<'de>>) -> Self {
        Self::with_options(events, WireOptions::default())
    }

    /// Replay `events` with the given options.
    pub fn with_options(events: impl IntoIterator<Item = WireEvent<'de>>, options: WireOptions) -> Self {
        Self {
            events: events.into_iter().collect(),
            context: WireContext::with_options(options),
        }
    }

    /// Events not consumed yet.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl<'de> WireReader<'de> for EventReader<'de> {
    type Error = Infallible;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn next_event(&mut self, _hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        Ok(self.events.pop_front())
    }

    fn peek_event(&mut self, _hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        Ok(self.events.front().cloned())
    }
}
