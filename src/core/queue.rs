//! # Pending-event queue.
//!
//! [`EventQueue`] is a thin wrapper around [`tokio::sync::mpsc::unbounded_channel`]
//! that adds a pending counter. Producers push from any thread; exactly one
//! [`QueueReceiver`] consumes.
//!
//! ## Architecture
//! ```text
//! Producers (many):                      Consumer (one):
//!   call() ──┐
//!   call() ──┼──► EventQueue ──(unbounded mpsc)──► QueueReceiver ──► Dispatcher
//!   call() ──┘        │                                  │
//!                     └──── pending += 1        pending -= 1
//! ```
//!
//! ## Rules
//! - **Non-blocking push**: `push()` never waits; it fails only once the receiver is closed.
//! - **FIFO**: events are received in push order (per producer, and globally as observed by the channel).
//! - **No persistence**: closing the receiver drops whatever is still queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

use crate::events::EventRef;

/// Creates a connected queue/receiver pair.
pub(crate) fn channel() -> (EventQueue, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        EventQueue {
            tx,
            pending: Arc::clone(&pending),
        },
        QueueReceiver { rx, pending },
    )
}

/// Producer side of the queue.
#[derive(Clone, Debug)]
pub(crate) struct EventQueue {
    tx: mpsc::UnboundedSender<EventRef>,
    pending: Arc<AtomicUsize>,
}

impl EventQueue {
    /// Enqueues `event`. Returns `false` if the receiver is gone.
    pub(crate) fn push(&self, event: EventRef) -> bool {
        // Counted before the send so the consumer never decrements below zero.
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(event).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    /// Number of events pushed but not yet received.
    #[inline]
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

/// Consumer side of the queue.
#[derive(Debug)]
pub(crate) struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<EventRef>,
    pending: Arc<AtomicUsize>,
}

impl QueueReceiver {
    /// Waits for the next event. Returns `None` when every producer is gone.
    pub(crate) async fn recv(&mut self) -> Option<EventRef> {
        let event = self.rx.recv().await?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(event)
    }

    /// Takes the next event if one is already queued.
    pub(crate) fn try_recv(&mut self) -> Option<EventRef> {
        let event = self.rx.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(event)
    }

    /// Closes the queue to new events and drops everything still in it.
    ///
    /// Returns the number of events dropped.
    pub(crate) fn close_and_drain(&mut self) -> usize {
        self.rx.close();
        let mut dropped = 0;
        while self.try_recv().is_some() {
            dropped += 1;
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    #[tokio::test]
    async fn test_fifo_and_pending_count() {
        let (queue, mut rx) = channel();
        let a: EventRef = Arc::new(Event::new());
        let b: EventRef = Arc::new(Event::new());

        assert!(queue.push(Arc::clone(&a)));
        assert!(queue.push(Arc::clone(&b)));
        assert_eq!(queue.pending(), 2);

        assert_eq!(rx.recv().await.map(|e| e.id()), Some(a.id()));
        assert_eq!(rx.try_recv().map(|e| e.id()), Some(b.id()));
        assert_eq!(queue.pending(), 0);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_close_drops_pending_and_rejects_push() {
        let (queue, mut rx) = channel();
        for _ in 0..3 {
            queue.push(Arc::new(Event::new()));
        }

        assert_eq!(rx.close_and_drain(), 3);
        assert!(!queue.push(Arc::new(Event::new())));
        assert_eq!(queue.pending(), 0);
    }
}
