//! Input event reader
//!
//! Reads fixed-size `struct input_event` records from any byte stream into
//! a bounded ring buffer.

use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use contracts::{
    DriverError, DriverResult, EventSource, InputEventRecord, RawEvent, INPUT_EVENT_SIZE,
};
use ringbuf::{traits::*, HeapRb};
use tracing::{debug, trace, warn};

/// Buffered reader over a raw input-event stream
///
/// A fill never reads more bytes than the free ring space can hold, so
/// decoded records always fit. A record split across two reads is carried
/// over and completed by the next fill.
pub struct InputReader<R> {
    inner: R,
    ring: HeapRb<RawEvent>,
    carry: BytesMut,
    scratch: Vec<u8>,
    exhausted: bool,
}

impl<R: Read> InputReader<R> {
    /// Create a reader buffering up to `capacity` records (minimum 1)
    pub fn new(inner: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            ring: HeapRb::new(capacity),
            carry: BytesMut::with_capacity(INPUT_EVENT_SIZE),
            scratch: vec![0u8; capacity * INPUT_EVENT_SIZE],
            exhausted: false,
        }
    }

    /// Number of decoded records waiting to be consumed
    pub fn buffered(&self) -> usize {
        self.ring.occupied_len()
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    fn decode_carry(&mut self) -> usize {
        let mut decoded = 0;
        while self.carry.len() >= INPUT_EVENT_SIZE {
            let chunk = self.carry.split_to(INPUT_EVENT_SIZE);
            let Some(record) = InputEventRecord::from_bytes(&chunk[..]) else {
                break;
            };
            if self.ring.try_push(RawEvent::from(record)).is_err() {
                // unreachable while reads are bounded by vacant space
                warn!("input ring full, record dropped");
                break;
            }
            decoded += 1;
        }
        decoded
    }
}

impl<R: Read> EventSource for InputReader<R> {
    fn fill(&mut self) -> DriverResult<usize> {
        let vacant = self.ring.vacant_len();
        if vacant == 0 {
            trace!("input ring full, skipping read");
            return Ok(0);
        }

        let want = vacant * INPUT_EVENT_SIZE - self.carry.len();
        match self.inner.read(&mut self.scratch[..want]) {
            Ok(0) => {
                if !self.exhausted {
                    debug!(partial_bytes = self.carry.len(), "input stream reached end");
                }
                self.exhausted = true;
                Ok(0)
            }
            Ok(n) => {
                self.carry.extend_from_slice(&self.scratch[..n]);
                let decoded = self.decode_carry();
                trace!(bytes = n, records = decoded, "input stream filled");
                Ok(decoded)
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                warn!(error = %e, "input stream read failed");
                Err(DriverError::stream_read(&e))
            }
        }
    }

    fn peek(&self) -> Option<RawEvent> {
        self.ring.iter().next().copied()
    }

    fn advance(&mut self) {
        let _ = self.ring.try_pop();
    }

    fn has_pending(&self) -> bool {
        !self.ring.is_empty()
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
