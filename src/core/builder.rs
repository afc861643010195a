use std::sync::Arc;

use super::{
    config::Config, dispatcher::Dispatcher, event_thread::EventThread, manager::EventManager,
    queue,
};
use crate::listeners::Listener;

/// Builder for constructing an [`EventThread`] with initial listeners.
pub struct EventThreadBuilder {
    cfg: Config,
    listeners: Vec<Arc<dyn Listener>>,
}

impl EventThreadBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            listeners: Vec::new(),
        }
    }

    /// Sets the listeners registered before the worker starts.
    ///
    /// They are registered in order, so equal-priority handlers keep this order.
    pub fn with_listeners(mut self, listeners: Vec<Arc<dyn Listener>>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Builds the event thread and spawns its dispatch worker.
    ///
    /// This consumes the builder and initializes:
    /// - the pending-event queue
    /// - the dispatcher with every initial listener registered
    /// - the worker task on the current Tokio runtime
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Arc<EventThread> {
        let (tx, rx) = queue::channel();
        let dispatcher = Arc::new(Dispatcher::new(&self.cfg));
        let thread = Arc::new(EventThread::new_internal(self.cfg, tx, dispatcher));

        thread.register_all(self.listeners);
        thread.start(rx);
        thread
    }
}
