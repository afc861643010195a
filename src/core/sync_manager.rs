//! # SyncEventManager: an event manager pumped by its owner.
//!
//! Same queue and dispatcher as [`EventThread`](crate::EventThread), but no
//! background worker: handlers run on whichever task calls
//! [`dispatch_pending`](SyncEventManager::dispatch_pending) or
//! [`dispatch_next`](SyncEventManager::dispatch_next). Useful for frame/tick-driven
//! applications and for deterministic tests.
//!
//! ```text
//! producers ── call() ──► EventQueue ──► [async mutex] ──► dispatch_pending() ──► Dispatcher
//!                                          (one pump at a time)
//! ```
//!
//! ## Rules
//! - Concurrent pumps are serialized, so handlers still never run in parallel.
//! - `dispatch_pending` handles the events queued when it started; events that
//!   handlers submit meanwhile wait for the next pump.
//! - A handler must not pump the manager that is dispatching it: the second pump
//!   waits on the first forever.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::{
    config::Config,
    dispatcher::{DispatchReport, Dispatcher},
    manager::EventManager,
    queue::{self, EventQueue, QueueReceiver},
};
use crate::events::EventRef;
use crate::listeners::{HandlerReference, Listener};

/// Event manager whose dispatch loop is driven by the caller.
pub struct SyncEventManager {
    cfg: Config,
    queue: EventQueue,
    rx: Mutex<QueueReceiver>,
    dispatcher: Dispatcher,
}

impl SyncEventManager {
    pub fn new(cfg: Config) -> Self {
        let (queue, rx) = queue::channel();
        let dispatcher = Dispatcher::new(&cfg);
        Self {
            cfg,
            queue,
            rx: Mutex::new(rx),
            dispatcher,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Dispatches the oldest queued event, if any.
    pub async fn dispatch_next(&self) -> Option<DispatchReport> {
        let mut rx = self.rx.lock().await;
        let event = rx.try_recv()?;
        Some(self.dispatcher.dispatch(event).await)
    }

    /// Dispatches, in FIFO order, the events that were queued when the call started.
    ///
    /// Returns the number of events dispatched.
    pub async fn dispatch_pending(&self) -> usize {
        let mut rx = self.rx.lock().await;
        let budget = self.queue.pending();
        let mut dispatched = 0;
        while dispatched < budget {
            let Some(event) = rx.try_recv() else {
                break;
            };
            self.dispatcher.dispatch(event).await;
            dispatched += 1;
        }
        if dispatched > 0 {
            tracing::trace!(name = %self.cfg.name, dispatched, "pending events dispatched");
        }
        dispatched
    }
}

impl EventManager for SyncEventManager {
    fn call(&self, event: EventRef) -> bool {
        self.queue.push(event)
    }

    fn register(&self, listener: Arc<dyn Listener>) {
        self.dispatcher.register(listener);
    }

    fn unregister(&self, listener: &dyn Listener) {
        self.dispatcher.unregister(listener);
    }

    fn registered_handlers(&self) -> Arc<[HandlerReference]> {
        self.dispatcher.snapshot()
    }

    fn pending(&self) -> usize {
        self.queue.pending()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::error::BoxError;
    use crate::events::{Cancellable, CancellableEvent, Event};
    use crate::listeners::HandlerPriority;

    #[derive(Default)]
    struct Journal {
        lines: StdMutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, line: impl Into<String>) {
            self.lines.lock().unwrap().push(line.into());
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    /// Cancels every cancellable event up front.
    struct Veto(Arc<Journal>);

    impl Listener for Veto {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![
                HandlerReference::on_cancellable(&self, "veto", |this: &Veto, _, flag| {
                    flag.cancel();
                    this.0.push("veto");
                    Ok(())
                })
                .with_priority(HandlerPriority::First),
            ]
        }
    }

    /// One handler that honors the flag and one that ignores it.
    struct Downstream(Arc<Journal>);

    impl Downstream {
        fn polite(&self, ev: &CancellableEvent) -> Result<(), BoxError> {
            if !ev.is_cancelled() {
                self.0.push("polite");
            }
            Ok(())
        }

        fn stubborn(&self, _: &CancellableEvent) -> Result<(), BoxError> {
            self.0.push("stubborn");
            Ok(())
        }
    }

    impl Listener for Downstream {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![
                HandlerReference::on(&self, "polite", Downstream::polite),
                HandlerReference::on(&self, "stubborn", Downstream::stubborn)
                    .with_priority(HandlerPriority::Late),
            ]
        }
    }

    #[tokio::test]
    async fn test_cancellation_is_cooperative() {
        let journal = Arc::new(Journal::default());
        let events = SyncEventManager::new(Config::default());
        events.register(Arc::new(Downstream(Arc::clone(&journal))));
        events.register(Arc::new(Veto(Arc::clone(&journal))));

        let ev = Arc::new(CancellableEvent::new());
        assert!(events.call(ev.clone()));
        assert_eq!(events.dispatch_pending().await, 1);

        assert!(ev.is_cancelled());
        assert_eq!(journal.lines(), vec!["veto", "stubborn"]);
    }

    #[tokio::test]
    async fn test_fifo_and_budget() {
        let journal = Arc::new(Journal::default());
        let sink = Arc::clone(&journal);
        let events = SyncEventManager::new(Config::default());
        events.register(crate::listeners::ListenerFn::arc("ids", move |ev: &Event| {
            sink.push(ev.id().to_string());
            Ok(())
        }));

        let first = Event::new();
        let second = Event::new();
        let ids = vec![first.id().to_string(), second.id().to_string()];
        events.publish(first);
        events.publish(second);
        assert_eq!(events.pending(), 2);

        assert_eq!(events.dispatch_pending().await, 2);
        assert_eq!(journal.lines(), ids);
        assert_eq!(events.pending(), 0);
        assert!(events.dispatch_next().await.is_none());
    }

    #[tokio::test]
    async fn test_published_events_have_distinct_ids() {
        let journal = Arc::new(Journal::default());
        let sink = Arc::clone(&journal);
        let events = SyncEventManager::new(Config::default());
        events.register(crate::listeners::ListenerFn::arc("ids", move |ev: &Event| {
            sink.push(ev.id().to_string());
            Ok(())
        }));

        for _ in 0..16 {
            events.publish(Event::new());
        }
        assert_eq!(events.dispatch_pending().await, 16);

        let ids = journal.lines();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), 16);
        assert_eq!(unique.len(), 16);
    }

    #[tokio::test]
    async fn test_dispatch_next_reports() {
        let events = SyncEventManager::new(Config::default());
        events.publish(Event::new());

        let report = events.dispatch_next().await.unwrap();
        assert_eq!(report.considered(), 0);
        assert!(events.registered_handlers().is_empty());
    }
}
