//! # Example: cause_chain
//!
//! A request/reply exchange traced back to its origin.
//!
//! Demonstrates how to:
//! - Define application events that embed an [`Event`].
//! - Publish a follow-up event from inside a handler with `Event::caused_by`.
//! - Print the causal chain with [`diagnostics::print_cause_chain`].
//! - Attach the built-in [`LogWriter`] at the `Last` tier.
//!
//! ## Flow
//! ```text
//! main ──► publish(Request{cause: startup})
//!     └─► dispatch worker
//!           ├─► Responder::on_request ──► publish(Reply{cause: request})
//!           └─► LogWriter (Last)
//!     └─► dispatch worker
//!           ├─► Tracer::on_reply ──► print_cause_chain(reply)
//!           └─► LogWriter (Last)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example cause_chain --features logging
//! ```

use std::sync::{Arc, OnceLock, Weak};

use eventvisor::{
    BoxError, Config, Event, EventManager, EventRef, EventThread, Handleable, HandlerReference,
    Listener, LogWriter, diagnostics,
};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Request {
    event: Event,
    path: &'static str,
}

impl Handleable for Request {
    fn event(&self) -> &Event {
        &self.event
    }
}

#[derive(Debug)]
struct Reply {
    event: Event,
    status: u16,
}

impl Handleable for Reply {
    fn event(&self) -> &Event {
        &self.event
    }
}

/// Answers every request. Holds the manager weakly to avoid a reference cycle.
#[derive(Default)]
struct Responder {
    events: OnceLock<Weak<EventThread>>,
}

impl Listener for Responder {
    fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
        vec![HandlerReference::on_async(
            &self,
            "on_request",
            |this: Arc<Responder>, req: Arc<Request>| async move {
                let Some(events) = this.events.get().and_then(Weak::upgrade) else {
                    return Ok(());
                };
                let status = if req.path == "/" { 200 } else { 404 };
                let cause: EventRef = req;
                events.publish(Reply {
                    event: Event::caused_by(cause),
                    status,
                });
                Ok(())
            },
        )]
    }
}

/// Prints the cause chain of every reply, then signals `main`.
struct Tracer {
    done: Arc<Notify>,
}

impl Tracer {
    fn on_reply(&self, reply: &Reply) -> Result<(), BoxError> {
        println!("reply status={}", reply.status);
        diagnostics::print_cause_chain(reply, &mut std::io::stdout().lock())?;
        self.done.notify_one();
        Ok(())
    }
}

impl Listener for Tracer {
    fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
        vec![HandlerReference::on(&self, "on_reply", Tracer::on_reply)]
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let done = Arc::new(Notify::new());
    let responder = Arc::new(Responder::default());

    let events = EventThread::builder(Config::named("demo"))
        .with_listeners(vec![
            responder.clone(),
            Arc::new(Tracer { done: done.clone() }),
            Arc::new(LogWriter::new()),
        ])
        .build();
    let _ = responder.events.set(Arc::downgrade(&events));

    let startup: EventRef = Arc::new(Event::new());
    events.publish(Request {
        event: Event::caused_by(startup),
        path: "/",
    });

    done.notified().await;
    events.shutdown().await?;
    Ok(())
}
