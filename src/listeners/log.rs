//! # LogWriter: simple event logger
//!
//! A minimal listener that logs every event it sees through `tracing`.
//! Use it for tests or demos; it runs at [`HandlerPriority::Last`] by default so
//! it observes events after every other handler.
//!
//! ## Example output
//! ```text
//! INFO event priority=last cancelled=None line="app::Reply id=… cause=… Reply { .. }"
//! INFO event priority=last cancelled=Some(true) line="eventvisor::events::cancel::CancellableEvent id=… cause=- …"
//! ```

use std::sync::Arc;

use crate::events::{Handleable, diagnostics};
use crate::listeners::{HandlerPriority, HandlerReference, Listener};

/// Event logging listener.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    priority: HandlerPriority,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] at [`HandlerPriority::Last`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: HandlerPriority::Last,
        }
    }

    /// Construct a [`LogWriter`] at the given tier.
    #[must_use]
    pub fn at(priority: HandlerPriority) -> Self {
        Self { priority }
    }

    fn write(&self, ev: &dyn Handleable) {
        tracing::info!(
            priority = %self.priority,
            cancelled = ?ev.as_cancellable().map(|c| c.is_cancelled()),
            line = %diagnostics::describe(ev),
            "event"
        );
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for LogWriter {
    fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
        let priority = self.priority;
        vec![
            HandlerReference::on_any(&self, "write", |this: &Self, ev| {
                this.write(ev);
                Ok(())
            })
            .with_priority(priority),
        ]
    }

    fn name(&self) -> &str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    #[tokio::test]
    async fn test_accepts_every_event() {
        let refs = Arc::new(LogWriter::at(HandlerPriority::Early)).handlers();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].priority(), HandlerPriority::Early);
        assert!(refs[0].try_accepts(&Event::new()).unwrap());
        assert!(refs[0].invoke(Arc::new(Event::new())).await.is_ok());
    }
}
