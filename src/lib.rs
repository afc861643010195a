//! # eventvisor
//!
//! **Eventvisor** is an in-process publish/subscribe event bus for Rust.
//!
//! Producers submit immutable event records; a single dispatch worker delivers
//! each event, in priority order, to every registered handler that accepts it.
//! Handlers can cooperatively cancel an event for later handlers, and events can
//! name the event that caused them for diagnostic trace-back.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  producer #1 │   │  producer #2 │   │  producer #3 │
//!     │ (any thread) │   │ (any thread) │   │  (a handler) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ call(event)      │ publish(ev)      │ publish(Reply::caused_by(ev))
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 EventQueue (unbounded mpsc, FIFO)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │    dispatch worker     │  (EventThread: tokio task,
//!                       │  Dispatcher::dispatch  │   SyncEventManager: caller)
//!                       └───────────┬────────────┘
//!                                   │ snapshot Arc<[HandlerReference]>
//!                                   ▼
//!         First ─► Earliest ─► ... ─► Normal ─► ... ─► Latest ─► Last
//!           │                           │                         │
//!      try_accepts?                try_accepts?              try_accepts?
//!           ▼                           ▼                         ▼
//!        invoke()                    invoke()                  invoke()
//!   (failures logged, the loop always moves on to the next handler)
//! ```
//!
//! ### Registration
//! ```text
//! Listener ──► register(Arc<dyn Listener>)
//!                 └─► Listener::handlers() ─► [HandlerReference{site, priority, accepts, invoke}]
//!                 └─► append to live list, stable sort by HandlerPriority, publish new snapshot
//!
//! unregister(&listener) ─► drop every HandlerReference bound to that instance
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                             |
//! |-------------------|------------------------------------------------------------------|------------------------------------------------|
//! | **Events**        | Event records with unique ids and optional causes.               | [`Event`], [`Handleable`], [`EventRef`]        |
//! | **Cancellation**  | Advisory per-event flag; the dispatcher never reads it.          | [`Cancellable`], [`CancellableEvent`]          |
//! | **Listeners**     | Explicit handler sites with priority tiers.                      | [`Listener`], [`HandlerReference`], [`HandlerPriority`] |
//! | **Managers**      | Background worker or caller-pumped dispatch.                     | [`EventManager`], [`EventThread`], [`SyncEventManager`] |
//! | **Diagnostics**   | Cause-chain walk and printing.                                   | [`diagnostics`]                                |
//! | **Errors**        | Typed per-handler and lifecycle errors.                          | [`HandlerError`], [`RuntimeError`]             |
//! | **Configuration** | Manager name, re-registration behavior, shutdown grace.          | [`Config`], [`Reregistration`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] listener _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{
//!     BoxError, CancellableEvent, Cancellable, Config, EventManager, EventThread,
//!     HandlerPriority, HandlerReference, Listener,
//! };
//!
//! struct Firewall;
//!
//! impl Firewall {
//!     fn inspect(&self, ev: &CancellableEvent) -> Result<(), BoxError> {
//!         ev.cancel();
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for Firewall {
//!     fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
//!         vec![HandlerReference::on(&self, "inspect", Firewall::inspect)
//!             .with_priority(HandlerPriority::First)]
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let events = EventThread::builder(Config::default())
//!         .with_listeners(vec![Arc::new(Firewall)])
//!         .build();
//!
//!     let packet = Arc::new(CancellableEvent::new());
//!     events.call(packet.clone());
//!
//!     while !packet.is_cancelled() {
//!         tokio::task::yield_now().await;
//!     }
//!     events.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{
    Config, DispatchReport, EventManager, EventThread, EventThreadBuilder, Reregistration,
    SyncEventManager,
};
pub use error::{BoxError, HandlerError, RuntimeError};
pub use events::diagnostics;
pub use events::{
    AsAny, CancelFlag, Cancellable, CancellableEvent, Event, EventRef, Handleable, downcast_event,
};
pub use listeners::{HandlerPriority, HandlerReference, Listener, ListenerFn, ParsePriorityError};

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
