//! # Pending Queue
//!
//! FIFO of envelopes triggered before the channel received its subscription
//! token.
//!
//! Flushing takes the whole queue out under the guard and sends outside it,
//! repeating until the queue is observed empty. A send that re-enters the
//! channel therefore never blocks on this guard, and anything enqueued while a
//! pass was sending is picked up by the next pass.

use super::envelope::EventEnvelope;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Guarded FIFO of envelopes awaiting a token.
#[derive(Debug, Default)]
pub struct PendingQueue {
    queue: Mutex<VecDeque<EventEnvelope>>,
}

impl PendingQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an envelope. Returns the queue length after the append.
    pub fn enqueue(&self, envelope: EventEnvelope) -> usize {
        let mut queue = self.queue.lock();
        queue.push_back(envelope);
        queue.len()
    }

    /// Remove and return every queued envelope in enqueue order.
    #[must_use]
    pub fn drain(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.queue.lock()).into()
    }

    /// Hand every queued envelope to `send` in FIFO order until the queue is
    /// empty. Returns the number of envelopes sent.
    pub fn flush_with<F>(&self, mut send: F) -> usize
    where
        F: FnMut(EventEnvelope),
    {
        let mut flushed = 0;
        loop {
            let batch = self.drain();
            if batch.is_empty() {
                return flushed;
            }
            flushed += batch.len();
            batch.into_iter().for_each(&mut send);
        }
    }

    /// Number of queued envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
