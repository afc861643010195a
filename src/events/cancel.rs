//! # Cooperative cancellation.
//!
//! Some events carry a single advisory flag. A handler may set it to tell
//! later (lower-tier) handlers that the event "should be ignored"; those handlers
//! decide for themselves whether to honour it.
//!
//! The dispatch loop **never** reads the flag and never skips a handler because of it:
//! ```text
//! Early handler ─► set_cancelled(true)
//! Normal handler (ignores flag)      ─► still runs, still has effect
//! Late handler   (checks flag first) ─► returns early on its own
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use super::event::{Event, EventRef, Handleable};

/// Advisory "should be ignored" flag exposed by cancellable events.
pub trait Cancellable: Send + Sync {
    /// Returns the current flag value.
    fn is_cancelled(&self) -> bool;

    /// Sets the flag.
    fn set_cancelled(&self, cancelled: bool);

    /// Shorthand for `set_cancelled(true)`.
    fn cancel(&self) {
        self.set_cancelled(true);
    }
}

/// Atomic cancellation flag, `false` until set.
///
/// Embed it in an event type and return it from
/// [`Handleable::as_cancellable`] to make that type cancellable.
#[derive(Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }
}

impl Cancellable for CancelFlag {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    fn set_cancelled(&self, cancelled: bool) {
        self.0.store(cancelled, Ordering::Release);
    }
}

impl fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelFlag").field(&self.is_cancelled()).finish()
    }
}

/// Ready-made event record carrying a [`CancelFlag`].
#[derive(Debug, Default)]
pub struct CancellableEvent {
    event: Event,
    flag: CancelFlag,
}

impl CancellableEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caused_by(cause: EventRef) -> Self {
        Self {
            event: Event::caused_by(cause),
            flag: CancelFlag::new(),
        }
    }
}

impl Cancellable for CancellableEvent {
    fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    fn set_cancelled(&self, cancelled: bool) {
        self.flag.set_cancelled(cancelled);
    }
}

impl Handleable for CancellableEvent {
    fn event(&self) -> &Event {
        &self.event
    }

    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        Some(&self.flag)
    }
}
