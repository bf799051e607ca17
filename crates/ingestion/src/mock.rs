//! Mock event source
//!
//! Scripted event stream for tests without an input device.

use std::collections::VecDeque;

use contracts::{DriverError, DriverResult, EventSource, RawEvent};
use tracing::trace;

/// Outcome of one scripted fill
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedFill {
    /// Records made available by this fill
    Events(Vec<RawEvent>),
    /// The fill fails with this errno
    Error(i32),
}

/// Mock event source
///
/// Each call to `fill` plays the next scripted step. Once the script is
/// used up, fills return `Ok(0)` and the source reports itself exhausted.
#[derive(Debug, Default)]
pub struct MockEventSource {
    script: VecDeque<ScriptedFill>,
    buffer: VecDeque<RawEvent>,
    fills: usize,
    consumed: usize,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source delivering `events` in a single fill
    pub fn from_events(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self::new().then_events(events)
    }

    /// Append a fill delivering `events`
    pub fn then_events(mut self, events: impl IntoIterator<Item = RawEvent>) -> Self {
        self.script
            .push_back(ScriptedFill::Events(events.into_iter().collect()));
        self
    }

    /// Append a failing fill
    pub fn then_error(mut self, errno: i32) -> Self {
        self.script.push_back(ScriptedFill::Error(errno));
        self
    }

    /// Number of `fill` calls so far
    pub fn fills(&self) -> usize {
        self.fills
    }

    /// Number of records consumed through `advance`
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl EventSource for MockEventSource {
    fn fill(&mut self) -> DriverResult<usize> {
        self.fills += 1;
        match self.script.pop_front() {
            Some(ScriptedFill::Events(events)) => {
                let n = events.len();
                self.buffer.extend(events);
                trace!(records = n, "mock source filled");
                Ok(n)
            }
            Some(ScriptedFill::Error(errno)) => Err(DriverError::StreamRead { errno }),
            None => Ok(0),
        }
    }

    fn peek(&self) -> Option<RawEvent> {
        self.buffer.front().copied()
    }

    fn advance(&mut self) {
        if self.buffer.pop_front().is_some() {
            self.consumed += 1;
        }
    }

    fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::REL_RX;

    #[test]
    fn test_script_plays_in_order() {
        let mut source = MockEventSource::new()
            .then_events([RawEvent::relative(REL_RX, 1)])
            .then_error(5)
            .then_events([RawEvent::sync()]);

        assert_eq!(source.fill(), Ok(1));
        assert_eq!(source.fill(), Err(DriverError::StreamRead { errno: 5 }));
        assert_eq!(source.fill(), Ok(1));
        assert!(source.is_exhausted());
        assert_eq!(source.fill(), Ok(0));
        assert_eq!(source.fills(), 4);

        assert_eq!(source.peek(), Some(RawEvent::relative(REL_RX, 1)));
        source.advance();
        assert_eq!(source.peek(), Some(RawEvent::sync()));
        source.advance();
        assert!(!source.has_pending());
        assert_eq!(source.consumed(), 2);
    }
}
