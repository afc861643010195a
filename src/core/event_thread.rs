//! # EventThread: an event manager with a dedicated dispatch worker.
//!
//! The [`EventThread`] owns the pending-event queue, the live handler list, and
//! one spawned tokio task (the **dispatch worker**) that is the only place
//! handlers ever run.
//!
//! ## High-level architecture
//! ```text
//! Producers (any thread):
//!   call(event) ──► EventQueue (unbounded mpsc, never blocks)
//!
//! Dispatch worker (one tokio task, span "event_worker"):
//!   loop {
//!     select! (biased) {
//!       token.cancelled()  ─► break
//!       queue.recv()       ─► Dispatcher::dispatch(event).await   (runs to completion)
//!     }
//!   }
//!   on exit: close queue, drop pending events (warn with count)
//!
//! Registration (any thread):
//!   register / unregister ──► Dispatcher (copy-on-write list)
//!
//! Shutdown path:
//!   shutdown() ─► token.cancel()
//!              ─► wait for worker up to cfg.grace:
//!                    ├─ joined          → Ok(())
//!                    ├─ join error      → RuntimeError::WorkerPanicked
//!                    └─ grace exceeded  → abort worker, RuntimeError::GraceExceeded
//! ```
//!
//! ## Rules
//! - The worker waits on the channel when idle; it does not spin.
//! - Cancellation is checked only between events: the in-flight event always
//!   finishes (or is aborted by `shutdown` after the grace period).
//! - Events still queued when the worker stops are dropped, never delivered.
//! - Dropping the last `Arc<EventThread>` cancels the worker.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Config, Event, EventManager, EventThread, ListenerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let events = EventThread::builder(Config::default())
//!         .with_listeners(vec![ListenerFn::arc("hello", |ev: &Event| {
//!             println!("got {}", ev.id());
//!             Ok(())
//!         })])
//!         .build();
//!
//!     events.publish(Event::new());
//!     tokio::task::yield_now().await;
//!
//!     events.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::core::{
    builder::EventThreadBuilder,
    config::Config,
    dispatcher::Dispatcher,
    manager::EventManager,
    queue::{EventQueue, QueueReceiver},
};
use crate::error::RuntimeError;
use crate::events::EventRef;
use crate::listeners::{HandlerReference, Listener};

/// Event manager backed by a single background dispatch worker.
pub struct EventThread {
    cfg: Config,
    queue: EventQueue,
    dispatcher: Arc<Dispatcher>,
    token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventThread {
    /// Starts an event thread with no listeners.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn new(cfg: Config) -> Arc<Self> {
        EventThreadBuilder::new(cfg).build()
    }

    /// Returns a builder for configuring initial listeners.
    pub fn builder(cfg: Config) -> EventThreadBuilder {
        EventThreadBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        queue: EventQueue,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            cfg,
            queue,
            dispatcher,
            token: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the dispatch worker on the current runtime.
    pub(crate) fn start(&self, rx: QueueReceiver) {
        let span = tracing::debug_span!("event_worker", name = %self.cfg.name);
        let fut = worker_loop(Arc::clone(&self.dispatcher), rx, self.token.clone());
        *self.worker.lock() = Some(tokio::spawn(fut.instrument(span)));
    }

    /// The configuration this manager was built with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns `true` while the dispatch worker is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Asks the worker to stop after the event it is dispatching, without waiting.
    pub fn interrupt(&self) {
        self.token.cancel();
    }

    /// Stops the worker and waits up to [`Config::grace`] for it to exit.
    ///
    /// Calling it again after the worker was joined returns `Ok(())`.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.token.cancel();
        let Some(mut handle) = self.worker.lock().take() else {
            return Ok(());
        };

        let joined = match self.cfg.grace_period() {
            _ if handle.is_finished() => Some((&mut handle).await),
            Some(grace) => tokio::time::timeout(grace, &mut handle).await.ok(),
            None => None,
        };

        match joined {
            Some(Ok(())) => Ok(()),
            Some(Err(err)) => Err(RuntimeError::WorkerPanicked {
                name: self.cfg.name.to_string(),
                info: err.to_string(),
            }),
            None => {
                handle.abort();
                tracing::warn!(
                    name = %self.cfg.name,
                    grace = ?self.cfg.grace,
                    "dispatch worker aborted"
                );
                Err(RuntimeError::GraceExceeded {
                    name: self.cfg.name.to_string(),
                    grace: self.cfg.grace,
                })
            }
        }
    }
}

impl EventManager for EventThread {
    fn call(&self, event: EventRef) -> bool {
        let accepted = self.queue.push(event);
        if !accepted {
            tracing::debug!(name = %self.cfg.name, "event rejected: dispatch worker stopped");
        }
        accepted
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

impl Drop for EventThread {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Dequeues and dispatches events until `token` is cancelled or every producer is gone.
async fn worker_loop(dispatcher: Arc<Dispatcher>, mut rx: QueueReceiver, token: CancellationToken) {
    tracing::debug!("dispatch worker started");
    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = rx.recv() => match next {
                Some(event) => event,
                None => break,
            },
        };
        dispatcher.dispatch(event).await;
    }

    let dropped = rx.close_and_drain();
    if dropped > 0 {
        tracing::warn!(dropped, "dispatch worker stopped with pending events; dropped");
    }
    tracing::debug!("dispatch worker stopped");
}
