//! Event data model and diagnostics.
//!
//! ## Contents
//! - [`Event`], [`Handleable`], [`EventRef`] the dispatchable record and its capability trait
//! - [`Cancellable`], [`CancelFlag`], [`CancellableEvent`] advisory cancellation
//! - [`diagnostics`] cause-chain tracing (`describe`, `cause_chain`, `print_cause_chain`)
//!
//! The dispatcher only needs `Handleable` from this module; cancellation and
//! diagnostics are for handlers and operators.

mod cancel;
pub mod diagnostics;
mod event;

pub use cancel::{CancelFlag, Cancellable, CancellableEvent};
pub use event::{AsAny, Event, EventRef, Handleable, downcast_event};
