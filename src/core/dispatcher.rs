//! # Dispatcher: the live handler list and the per-event delivery loop.
//!
//! Both managers own one [`Dispatcher`]; they differ only in who drives it
//! (a background worker or the caller).
//!
//! ## Architecture
//! ```text
//! register(listener) ──► listener.handlers()          (outside the lock)
//!                              │
//!                              ▼
//!                  write lock: copy live list ─► (Replace: drop listener's refs)
//!                              ─► append ─► stable sort by priority ─► swap in
//!
//! dispatch(event) ──► read lock: clone Arc<[HandlerReference]>   (snapshot)
//!                         │
//!                         └─► for each ref, in order:
//!                               try_accepts ─ Ok(false) ─► skipped
//!                                           ─ Err       ─► failed (warn)
//!                                           ─ Ok(true)  ─► invoke ─ Ok  ─► delivered
//!                                                                 ─ Err ─► failed (warn)
//! ```
//!
//! ## Rules
//! - Writers never mutate a published slice; readers hold a stable snapshot for the
//!   whole event, so concurrent (un)registration is observed from the next event on.
//! - A failing handler never stops the loop; every handler in the snapshot is considered.
//! - The dispatcher never reads the cancellation flag.

use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::config::{Config, Reregistration};
use crate::error::HandlerError;
use crate::events::{EventRef, Handleable};
use crate::listeners::{HandlerReference, Listener};

/// Outcome counters for one dispatched event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that accepted the event and returned normally.
    pub delivered: usize,
    /// Handlers whose acceptance check rejected the event.
    pub skipped: usize,
    /// Handlers whose acceptance check or invocation failed.
    pub failed: usize,
}

impl DispatchReport {
    /// Number of handlers considered (the snapshot length).
    #[inline]
    pub fn considered(&self) -> usize {
        self.delivered + self.skipped + self.failed
    }
}

/// Copy-on-write handler list plus the delivery loop.
pub(crate) struct Dispatcher {
    name: Cow<'static, str>,
    reregistration: Reregistration,
    handlers: RwLock<Arc<[HandlerReference]>>,
}

impl Dispatcher {
    pub(crate) fn new(cfg: &Config) -> Self {
        Self {
            name: cfg.name.clone(),
            reregistration: cfg.reregistration,
            handlers: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Adds the listener's handlers and re-sorts the live list before returning.
    ///
    /// Returns the number of handlers added.
    pub(crate) fn register(&self, listener: Arc<dyn Listener>) -> usize {
        let added = Arc::clone(&listener).handlers();
        let count = added.len();

        let mut live = self.handlers.write();
        let mut next: Vec<HandlerReference> = match self.reregistration {
            Reregistration::Append => live.to_vec(),
            Reregistration::Replace => live
                .iter()
                .filter(|h| !h.is_owned_by(&*listener))
                .cloned()
                .collect(),
        };
        let replaced = live.len() - next.len();
        next.extend(added);
        next.sort_by_key(HandlerReference::priority);
        let total = next.len();
        *live = Arc::from(next);
        drop(live);

        tracing::debug!(
            manager = %self.name,
            listener = listener.name(),
            added = count,
            replaced,
            total,
            "listener registered"
        );
        count
    }

    /// Removes every handler owned by `listener`.
    ///
    /// Returns the number of handlers removed.
    pub(crate) fn unregister(&self, listener: &dyn Listener) -> usize {
        let mut live = self.handlers.write();
        let before = live.len();
        if !live.iter().any(|h| h.is_owned_by(listener)) {
            return 0;
        }
        let next: Vec<HandlerReference> = live
            .iter()
            .filter(|h| !h.is_owned_by(listener))
            .cloned()
            .collect();
        let removed = before - next.len();
        let total = next.len();
        *live = Arc::from(next);
        drop(live);

        tracing::debug!(
            manager = %self.name,
            listener = listener.name(),
            removed,
            total,
            "listener unregistered"
        );
        removed
    }

    /// Point-in-time copy of the live list, in priority order.
    #[inline]
    pub(crate) fn snapshot(&self) -> Arc<[HandlerReference]> {
        Arc::clone(&self.handlers.read())
    }

    /// Delivers `event` to every accepting handler in the current snapshot.
    pub(crate) async fn dispatch(&self, event: EventRef) -> DispatchReport {
        let snapshot = self.snapshot();
        let mut report = DispatchReport::default();

        for handler in snapshot.iter() {
            match handler.try_accepts(event.as_ref()) {
                Ok(false) => report.skipped += 1,
                Ok(true) => match handler.invoke(Arc::clone(&event)).await {
                    Ok(()) => report.delivered += 1,
                    Err(err) => {
                        report.failed += 1;
                        self.log_failure(&err, event.as_ref());
                    }
                },
                Err(err) => {
                    report.failed += 1;
                    self.log_failure(&err, event.as_ref());
                }
            }
        }

        tracing::trace!(
            manager = %self.name,
            event = %event.id(),
            kind = event.kind(),
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "event dispatched"
        );
        report
    }

    fn log_failure(&self, err: &HandlerError, event: &dyn Handleable) {
        tracing::warn!(
            manager = %self.name,
            listener = err.listener(),
            site = err.site(),
            event = %event.id(),
            label = err.as_label(),
            error = %err.as_message(),
            "handler failed"
        );
    }
}
