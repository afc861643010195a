//! # The event manager contract.
//!
//! [`EventManager`] is what producers and application wiring see. It is
//! implemented by [`EventThread`](crate::EventThread) (background worker) and
//! [`SyncEventManager`](crate::SyncEventManager) (caller-pumped).
//!
//! ## Rules
//! - `call` and `publish` only enqueue: they never wait for dispatch and never look
//!   at handler state.
//! - `register` re-sorts the live handler list before it returns; the next event
//!   dequeued sees the change. Events already being dispatched do not.
//! - `unregister` compares listeners by identity (same allocation), not by value.

use std::sync::Arc;

use crate::events::{EventRef, Handleable};
use crate::listeners::{HandlerReference, Listener};

/// Producer-facing and registration-facing API of an event manager.
pub trait EventManager: Send + Sync {
    /// Enqueues `event` for delivery and returns immediately.
    ///
    /// Returns `false` only when the queue no longer accepts events (the manager stopped).
    fn call(&self, event: EventRef) -> bool;

    /// Wraps `event` in an [`EventRef`] and [`call`](EventManager::call)s it.
    fn publish<E: Handleable>(&self, event: E) -> bool
    where
        Self: Sized,
    {
        self.call(Arc::new(event))
    }

    /// Adds the listener's handlers to the live list (stable-sorted by priority).
    fn register(&self, listener: Arc<dyn Listener>);

    /// Registers each listener in iteration order.
    fn register_all<I>(&self, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn Listener>>,
        Self: Sized,
    {
        for listener in listeners {
            self.register(listener);
        }
    }

    /// Removes every handler owned by `listener`.
    fn unregister(&self, listener: &dyn Listener);

    /// Unregisters each listener in order.
    fn unregister_all(&self, listeners: &[Arc<dyn Listener>]) {
        for listener in listeners {
            self.unregister(listener.as_ref());
        }
    }

    /// Immutable point-in-time snapshot of the live handler list, in priority order.
    fn registered_handlers(&self) -> Arc<[HandlerReference]>;

    /// Number of events enqueued but not yet taken for dispatch.
    fn pending(&self) -> usize;
}
