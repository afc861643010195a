//! # Core listener trait
//!
//! `Listener` is the extension point for plugging application code into an
//! [`EventManager`](crate::EventManager). A listener lists its own handler sites
//! explicitly; there is no runtime scanning.
//!
//! ## Contract
//! - [`Listener::handlers`] is called on **every** registration, so it should be
//!   cheap and return the same sites each time.
//! - Sites run on the dispatch worker. A site that never returns stalls every
//!   event behind it.
//! - The manager keeps the listener alive (shared `Arc`) until it is unregistered.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{
//!     BoxError, Cancellable, CancellableEvent, HandlerPriority, HandlerReference, Listener,
//! };
//!
//! struct Guard;
//!
//! impl Guard {
//!     fn veto(&self, ev: &CancellableEvent) -> Result<(), BoxError> {
//!         ev.cancel();
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for Guard {
//!     fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
//!         vec![
//!             HandlerReference::on(&self, "veto", Guard::veto)
//!                 .with_priority(HandlerPriority::First),
//!         ]
//!     }
//!
//!     fn name(&self) -> &str {
//!         "guard"
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::BoxError;
use crate::events::Handleable;

use super::{HandlerPriority, HandlerReference};

/// Contract for event listeners.
pub trait Listener: Send + Sync + 'static {
    /// Lists this listener's handler sites, each bound to `self`.
    fn handlers(self: Arc<Self>) -> Vec<HandlerReference>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed listener with a single typed handler site.
///
/// ## Example
/// ```rust
/// use eventvisor::{Event, HandlerPriority, Listener, ListenerFn};
///
/// let l = ListenerFn::arc_at("printer", HandlerPriority::Late, |ev: &Event| {
///     println!("saw {}", ev.id());
///     Ok(())
/// });
/// assert_eq!(l.name(), "printer");
/// ```
pub struct ListenerFn<E, F> {
    name: Cow<'static, str>,
    priority: HandlerPriority,
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> ListenerFn<E, F>
where
    E: Handleable,
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    /// Creates a listener whose only site runs at [`HandlerPriority::Normal`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            priority: HandlerPriority::default(),
            f,
            _event: PhantomData,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Like [`ListenerFn::arc`], at the given tier.
    pub fn arc_at(
        name: impl Into<Cow<'static, str>>,
        priority: HandlerPriority,
        f: F,
    ) -> Arc<Self> {
        Arc::new(Self::new(name, f).with_priority(priority))
    }

    #[must_use]
    pub fn with_priority(mut self, priority: HandlerPriority) -> Self {
        self.priority = priority;
        self
    }
}

impl<E, F> Listener for ListenerFn<E, F>
where
    E: Handleable,
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
        let priority = self.priority;
        vec![
            HandlerReference::on(&self, "call", |this: &Self, ev: &E| (this.f)(ev))
                .with_priority(priority),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }
}
