//! EventSource trait - Raw event source abstraction
//!
//! Decouples the driver from where input records come from: a kernel
//! input node, a captured file, or a scripted test source.

use crate::{DriverResult, RawEvent};

/// Buffered source of raw input events
///
/// Records are pulled into an internal buffer by [`fill`](EventSource::fill)
/// and consumed one at a time with [`peek`](EventSource::peek) and
/// [`advance`](EventSource::advance). The cursor belongs to the source:
/// records the caller does not consume stay buffered for the next call.
pub trait EventSource {
    /// Read more records from the underlying stream
    ///
    /// Returns the number of complete records added to the buffer.
    ///
    /// # Errors
    /// [`DriverError::StreamRead`](crate::DriverError::StreamRead) when the
    /// stream reports an error.
    fn fill(&mut self) -> DriverResult<usize>;

    /// Record at the cursor, if any
    fn peek(&self) -> Option<RawEvent>;

    /// Consume the record at the cursor
    fn advance(&mut self);

    /// True while buffered records remain unconsumed
    fn has_pending(&self) -> bool {
        self.peek().is_some()
    }

    /// True once the underlying stream reached end-of-file
    ///
    /// Device nodes never end; captured streams do.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<T: EventSource + ?Sized> EventSource for Box<T> {
    fn fill(&mut self) -> DriverResult<usize> {
        (**self).fill()
    }

    fn peek(&self) -> Option<RawEvent> {
        (**self).peek()
    }

    fn advance(&mut self) {
        (**self).advance()
    }

    fn has_pending(&self) -> bool {
        (**self).has_pending()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// Monotonic nanosecond clock used to stamp finalized samples
pub trait MonotonicClock {
    fn now_ns(&self) -> i64;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for Box<T> {
    fn now_ns(&self) -> i64 {
        (**self).now_ns()
    }
}
