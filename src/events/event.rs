//! # Event records dispatched through an [`EventManager`](crate::EventManager).
//!
//! Every dispatchable value implements [`Handleable`]. The trait only asks for
//! access to the embedded [`Event`] record, which carries the two attributes the
//! engine cares about:
//! - **`id`**: a random 128-bit [`Uuid`], assigned once at construction;
//! - **`cause`**: an optional back-reference to the event that triggered this one.
//!
//! Application events are ordinary structs that embed an [`Event`]:
//!
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Event, EventRef, Handleable};
//!
//! #[derive(Debug)]
//! struct Notification {
//!     event: Event,
//!     text: String,
//! }
//!
//! impl Handleable for Notification {
//!     fn event(&self) -> &Event {
//!         &self.event
//!     }
//! }
//!
//! let root: EventRef = Arc::new(Event::new());
//! let n = Notification { event: Event::caused_by(root.clone()), text: "hi".into() };
//!
//! assert_eq!(n.cause().map(|c| c.id()), Some(root.id()));
//! assert_ne!(n.id(), root.id());
//! ```
//!
//! ## Rules
//! - The cause is fixed at construction, so chains built through [`Event::caused_by`]
//!   cannot loop. A custom [`Handleable::cause`] override can; the diagnostics
//!   walk guards against it.
//! - The engine drops its reference once dispatch finishes; a cause stays alive for
//!   as long as some event in the chain is held by application code.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::cancel::Cancellable;

/// Shared handle to a dispatchable event.
pub type EventRef = Arc<dyn Handleable>;

/// Object-safe bridge to [`Any`], implemented for every sized `'static` type.
///
/// Lets `dyn Handleable` be downcast without requiring boilerplate from implementors.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Capability every dispatchable event exposes: identity plus optional cause.
pub trait Handleable: AsAny + fmt::Debug {
    /// The embedded event record.
    fn event(&self) -> &Event;

    /// Unique identity of this event.
    fn id(&self) -> Uuid {
        self.event().id()
    }

    /// The event that caused this one, if any.
    fn cause(&self) -> Option<&EventRef> {
        self.event().cause()
    }

    /// Cancellation capability, for events that carry one.
    ///
    /// The dispatcher never reads it; handlers check it themselves.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// Human-readable event type (for logs).
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Handleable {
    /// Returns `true` if the runtime type of this event is `E`.
    #[inline]
    pub fn is<E: Handleable>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Borrows this event as `E` if that is its runtime type.
    #[inline]
    pub fn downcast_ref<E: Handleable>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Converts a shared event into its concrete type, handing the original back on mismatch.
pub fn downcast_event<E: Handleable>(event: EventRef) -> Result<Arc<E>, EventRef> {
    if !event.as_ref().is::<E>() {
        return Err(event);
    }
    let fallback = Arc::clone(&event);
    event.into_any_arc().downcast::<E>().map_err(|_| fallback)
}

/// The base event record: identity and optional cause.
///
/// Usable on its own as a plain event, or embedded in application types.
/// Not `Clone`: a copy would carry the same id. Share an event through [`EventRef`].
pub struct Event {
    id: Uuid,
    cause: Option<EventRef>,
}

impl Event {
    /// Creates a root event (no cause) with a fresh random id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cause: None,
        }
    }

    /// Creates an event triggered by `cause`.
    pub fn caused_by(cause: EventRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            cause: Some(cause),
        }
    }

    /// Unique identity of this event.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The event that caused this one, if any.
    #[inline]
    pub fn cause(&self) -> Option<&EventRef> {
        self.cause.as_ref()
    }

    /// Returns `true` if this event has no cause.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.cause.is_none()
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

// Only the cause id is printed: a full Debug of the chain would repeat every ancestor.
impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("cause", &self.cause.as_ref().map(|c| c.id()))
            .finish()
    }
}

impl Handleable for Event {
    fn event(&self) -> &Event {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Notification {
        event: Event,
    }

    impl Handleable for Notification {
        fn event(&self) -> &Event {
            &self.event
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Event::new();
        let b = Event::new();
        assert_ne!(a.id(), b.id());
        assert!(a.is_root());
    }

    #[test]
    fn test_caused_by_links_back() {
        let root: EventRef = Arc::new(Event::new());
        let child = Event::caused_by(Arc::clone(&root));

        assert!(!child.is_root());
        assert_eq!(child.cause().map(|c| c.id()), Some(root.id()));
    }

    #[test]
    fn test_runtime_type_checks() {
        let plain: EventRef = Arc::new(Event::new());
        let note: EventRef = Arc::new(Notification { event: Event::new() });

        assert!(plain.as_ref().is::<Event>());
        assert!(!plain.as_ref().is::<Notification>());
        assert!(note.as_ref().downcast_ref::<Notification>().is_some());
        assert!(note.as_ref().downcast_ref::<Event>().is_none());
    }

    #[test]
    fn test_downcast_event_returns_original_on_mismatch() {
        let plain: EventRef = Arc::new(Event::new());
        let id = plain.id();

        let back = downcast_event::<Notification>(plain).unwrap_err();
        assert_eq!(back.id(), id);

        let typed = downcast_event::<Event>(back).unwrap();
        assert_eq!(typed.id(), id);
    }

    #[test]
    fn test_debug_prints_cause_id_only() {
        let root: EventRef = Arc::new(Event::new());
        let child = Event::caused_by(Arc::clone(&root));
        let out = format!("{child:?}");
        assert!(out.contains(&root.id().to_string()));
        assert!(out.contains(&child.id().to_string()));
    }

    #[test]
    fn test_kind_names_concrete_type() {
        let note: EventRef = Arc::new(Notification { event: Event::new() });
        assert!(note.kind().ends_with("Notification"));
    }
}
