//! # Handler references: a listener, one of its handler sites, and a priority.
//!
//! A [`HandlerReference`] is what the dispatcher stores and iterates. It pairs an
//! **acceptance predicate** (does this site take this event?) with an **invoker**
//! (call the site with the event), both fixed at construction.
//!
//! ## Constructors
//! | constructor                          | accepts                              | site signature                          |
//! |--------------------------------------|--------------------------------------|-----------------------------------------|
//! | [`on`](HandlerReference::on)         | events whose runtime type is `E`     | `Fn(&L, &E) -> Result<(), BoxError>`    |
//! | [`on_async`](HandlerReference::on_async) | events whose runtime type is `E` | `Fn(Arc<L>, Arc<E>) -> impl Future`     |
//! | [`on_any`](HandlerReference::on_any) | every event                          | `Fn(&L, &dyn Handleable) -> Result<..>` |
//! | [`on_cancellable`](HandlerReference::on_cancellable) | events exposing [`Cancellable`] | `Fn(&L, &dyn Handleable, &dyn Cancellable) -> Result<..>` |
//! | [`from_parts`](HandlerReference::from_parts) | custom predicate              | `Fn(Arc<L>, Arc<E>) -> impl Future`     |
//!
//! ## Failure containment
//! [`try_accepts`](HandlerReference::try_accepts) and
//! [`invoke`](HandlerReference::invoke) never unwind: panics and errors come back as
//! [`HandlerError`] for the dispatch loop to log.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler panics while holding a lock.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::error::{BoxError, HandlerError, panic_message};
use crate::events::{Cancellable, EventRef, Handleable, downcast_event};

use super::{HandlerPriority, Listener};

type Accepts = dyn Fn(&dyn Handleable) -> bool + Send + Sync;

/// Why an invoker did not complete normally.
enum Fault {
    Binding {
        expected: &'static str,
        found: &'static str,
    },
    Failed(BoxError),
}

impl Fault {
    fn binding<E: ?Sized>(found: &dyn Handleable) -> Self {
        Fault::Binding {
            expected: type_name::<E>(),
            found: found.kind(),
        }
    }
}

/// Calls one handler site with an event.
#[async_trait]
trait Invoke: Send + Sync {
    async fn invoke(&self, event: EventRef) -> Result<(), Fault>;
}

/// Bound handler site the dispatcher can test and invoke.
#[derive(Clone)]
pub struct HandlerReference {
    listener: Arc<dyn Listener>,
    site: &'static str,
    parameter: &'static str,
    priority: HandlerPriority,
    accepts: Arc<Accepts>,
    invoker: Arc<dyn Invoke>,
}

impl HandlerReference {
    /// Binds a synchronous site taking events of type `E`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use eventvisor::{BoxError, Event, HandlerPriority, HandlerReference, Listener};
    ///
    /// struct Audit;
    ///
    /// impl Audit {
    ///     fn on_event(&self, ev: &Event) -> Result<(), BoxError> {
    ///         let _ = ev.id();
    ///         Ok(())
    ///     }
    /// }
    ///
    /// impl Listener for Audit {
    ///     fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
    ///         vec![HandlerReference::on(&self, "on_event", Audit::on_event)
    ///             .with_priority(HandlerPriority::Late)]
    ///     }
    /// }
    ///
    /// let refs = Arc::new(Audit).handlers();
    /// assert_eq!(refs[0].site(), "on_event");
    /// assert_eq!(refs[0].priority(), HandlerPriority::Late);
    /// ```
    pub fn on<L, E, F>(listener: &Arc<L>, site: &'static str, f: F) -> Self
    where
        L: Listener,
        E: Handleable,
        F: Fn(&L, &E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::bind(
            listener,
            site,
            type_name::<E>(),
            |ev: &dyn Handleable| ev.is::<E>(),
            SyncSite {
                listener: Arc::clone(listener),
                f,
                _event: PhantomData,
            },
        )
    }

    /// Binds an asynchronous site taking events of type `E`.
    pub fn on_async<L, E, F, Fut>(listener: &Arc<L>, site: &'static str, f: F) -> Self
    where
        L: Listener,
        E: Handleable,
        F: Fn(Arc<L>, Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::from_parts::<L, E, _, F, Fut>(listener, site, |ev: &dyn Handleable| ev.is::<E>(), f)
    }

    /// Binds a site that accepts every event.
    pub fn on_any<L, F>(listener: &Arc<L>, site: &'static str, f: F) -> Self
    where
        L: Listener,
        F: Fn(&L, &dyn Handleable) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::bind(
            listener,
            site,
            type_name::<dyn Handleable>(),
            |_: &dyn Handleable| true,
            AnySite {
                listener: Arc::clone(listener),
                f,
            },
        )
    }

    /// Binds a site that accepts every event exposing the cancellation capability.
    pub fn on_cancellable<L, F>(listener: &Arc<L>, site: &'static str, f: F) -> Self
    where
        L: Listener,
        F: Fn(&L, &dyn Handleable, &dyn Cancellable) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self::bind(
            listener,
            site,
            type_name::<dyn Cancellable>(),
            |ev: &dyn Handleable| ev.as_cancellable().is_some(),
            CancellableSite {
                listener: Arc::clone(listener),
                f,
            },
        )
    }

    /// Binds an asynchronous site with a caller-supplied acceptance predicate.
    ///
    /// The site still declares `E`: an event the predicate admits but that is not an
    /// `E` fails with [`HandlerError::Binding`] instead of reaching the site.
    pub fn from_parts<L, E, A, F, Fut>(
        listener: &Arc<L>,
        site: &'static str,
        accepts: A,
        f: F,
    ) -> Self
    where
        L: Listener,
        E: Handleable,
        A: Fn(&dyn Handleable) -> bool + Send + Sync + 'static,
        F: Fn(Arc<L>, Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::bind(
            listener,
            site,
            type_name::<E>(),
            accepts,
            AsyncSite {
                listener: Arc::clone(listener),
                f,
                _event: PhantomData,
            },
        )
    }

    fn bind<L, A, I>(
        listener: &Arc<L>,
        site: &'static str,
        parameter: &'static str,
        accepts: A,
        invoker: I,
    ) -> Self
    where
        L: Listener,
        A: Fn(&dyn Handleable) -> bool + Send + Sync + 'static,
        I: Invoke + 'static,
    {
        let owner: Arc<dyn Listener> = Arc::clone(listener) as Arc<dyn Listener>;
        Self {
            listener: owner,
            site,
            parameter,
            priority: HandlerPriority::default(),
            accepts: Arc::new(accepts),
            invoker: Arc::new(invoker),
        }
    }

    /// Sets the dispatch tier (default [`HandlerPriority::Normal`]).
    #[must_use]
    pub fn with_priority(mut self, priority: HandlerPriority) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    pub fn priority(&self) -> HandlerPriority {
        self.priority
    }

    /// Handler site name.
    #[inline]
    pub fn site(&self) -> &'static str {
        self.site
    }

    /// Declared parameter type name.
    #[inline]
    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// The owning listener.
    #[inline]
    pub fn listener(&self) -> &Arc<dyn Listener> {
        &self.listener
    }

    #[inline]
    pub fn listener_name(&self) -> &str {
        self.listener.name()
    }

    /// Returns `true` if `listener` is the very instance this reference was bound to.
    pub fn is_owned_by(&self, listener: &dyn Listener) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.listener), std::ptr::from_ref(listener))
    }

    /// Runs the acceptance predicate, turning a panic into [`HandlerError::Malformed`].
    pub fn try_accepts(&self, event: &dyn Handleable) -> Result<bool, HandlerError> {
        catch_unwind(AssertUnwindSafe(|| (self.accepts)(event))).map_err(|panic| {
            HandlerError::Malformed {
                listener: self.listener_name().to_string(),
                site: self.site,
                info: panic_message(&*panic),
            }
        })
    }

    /// Invokes the site with `event`.
    ///
    /// Does not check acceptance; the dispatcher calls [`try_accepts`](Self::try_accepts) first.
    pub async fn invoke(&self, event: EventRef) -> Result<(), HandlerError> {
        let fut = self.invoker.invoke(event);
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(Fault::Binding { expected, found })) => Err(HandlerError::Binding {
                listener: self.listener_name().to_string(),
                site: self.site,
                expected,
                found,
            }),
            Ok(Err(Fault::Failed(source))) => Err(HandlerError::Failed {
                listener: self.listener_name().to_string(),
                site: self.site,
                source,
            }),
            Err(panic) => Err(HandlerError::Panicked {
                listener: self.listener_name().to_string(),
                site: self.site,
                info: panic_message(&*panic),
            }),
        }
    }
}

/// Same listener instance and same site.
impl PartialEq for HandlerReference {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.listener), Arc::as_ptr(&other.listener))
            && self.site == other.site
    }
}

impl Eq for HandlerReference {}

impl fmt::Debug for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerReference")
            .field("listener", &self.listener_name())
            .field("site", &self.site)
            .field("parameter", &self.parameter)
            .field("priority", &self.priority)
            .finish()
    }
}

// ---- Invokers ----

struct SyncSite<L, E, F> {
    listener: Arc<L>,
    f: F,
    _event: PhantomData<fn(&E)>,
}

#[async_trait]
impl<L, E, F> Invoke for SyncSite<L, E, F>
where
    L: Listener,
    E: Handleable,
    F: Fn(&L, &E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn invoke(&self, event: EventRef) -> Result<(), Fault> {
        let ev = event
            .as_ref()
            .downcast_ref::<E>()
            .ok_or_else(|| Fault::binding::<E>(event.as_ref()))?;
        (self.f)(&*self.listener, ev).map_err(Fault::Failed)
    }
}

struct AsyncSite<L, E, F> {
    listener: Arc<L>,
    f: F,
    _event: PhantomData<fn(Arc<E>)>,
}

#[async_trait]
impl<L, E, F, Fut> Invoke for AsyncSite<L, E, F>
where
    L: Listener,
    E: Handleable,
    F: Fn(Arc<L>, Arc<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn invoke(&self, event: EventRef) -> Result<(), Fault> {
        let ev = downcast_event::<E>(event).map_err(|ev| Fault::binding::<E>(ev.as_ref()))?;
        (self.f)(Arc::clone(&self.listener), ev)
            .await
            .map_err(Fault::Failed)
    }
}

struct AnySite<L, F> {
    listener: Arc<L>,
    f: F,
}

#[async_trait]
impl<L, F> Invoke for AnySite<L, F>
where
    L: Listener,
    F: Fn(&L, &dyn Handleable) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn invoke(&self, event: EventRef) -> Result<(), Fault> {
        (self.f)(&*self.listener, event.as_ref()).map_err(Fault::Failed)
    }
}

struct CancellableSite<L, F> {
    listener: Arc<L>,
    f: F,
}

#[async_trait]
impl<L, F> Invoke for CancellableSite<L, F>
where
    L: Listener,
    F: Fn(&L, &dyn Handleable, &dyn Cancellable) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn invoke(&self, event: EventRef) -> Result<(), Fault> {
        let ev = event.as_ref();
        let flag = ev
            .as_cancellable()
            .ok_or_else(|| Fault::binding::<dyn Cancellable>(ev))?;
        (self.f)(&*self.listener, ev, flag).map_err(Fault::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CancellableEvent, Event};

    #[derive(Debug)]
    struct Login {
        event: Event,
        user: &'static str,
    }

    impl Handleable for Login {
        fn event(&self) -> &Event {
            &self.event
        }
    }

    fn login(user: &'static str) -> EventRef {
        Arc::new(Login {
            event: Event::new(),
            user,
        })
    }

    struct Greeter;

    impl Listener for Greeter {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![
                HandlerReference::on(&self, "on_login", |_: &Greeter, ev: &Login| {
                    if ev.user == "mallory" {
                        return Err("denied".into());
                    }
                    Ok(())
                }),
                HandlerReference::on_any(&self, "on_any", |_: &Greeter, _| Ok(()))
                    .with_priority(HandlerPriority::Last),
            ]
        }
    }

    #[test]
    fn test_typed_acceptance() {
        let refs = Arc::new(Greeter).handlers();
        let typed = &refs[0];

        assert!(typed.try_accepts(login("alice").as_ref()).unwrap());
        assert!(!typed.try_accepts(&Event::new()).unwrap());
        assert!(refs[1].try_accepts(&Event::new()).unwrap());
        assert!(typed.parameter().ends_with("Login"));
    }

    #[test]
    fn test_equality_is_listener_identity_and_site() {
        let greeter = Arc::new(Greeter);
        let a = Arc::clone(&greeter).handlers();
        let b = Arc::clone(&greeter).handlers();
        let other = Arc::new(Greeter).handlers();

        assert_eq!(a[0], b[0]);
        assert_ne!(a[0], a[1]);
        assert_ne!(a[0], other[0]);
        assert!(a[0].is_owned_by(&*greeter));
        assert!(!other[0].is_owned_by(&*greeter));
    }

    #[tokio::test]
    async fn test_invoke_maps_handler_error() {
        let refs = Arc::new(Greeter).handlers();

        assert!(refs[0].invoke(login("alice")).await.is_ok());
        let err = refs[0].invoke(login("mallory")).await.unwrap_err();
        assert_eq!(err.as_label(), "handler_failed");
        assert_eq!(err.site(), "on_login");
    }

    #[tokio::test]
    async fn test_invoke_wrong_type_is_binding_error() {
        let refs = Arc::new(Greeter).handlers();
        let err = refs[0].invoke(Arc::new(Event::new())).await.unwrap_err();
        assert!(matches!(err, HandlerError::Binding { .. }));
    }

    struct Loose;

    impl Listener for Loose {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![HandlerReference::from_parts(
                &self,
                "on_everything",
                |_: &dyn Handleable| true,
                |_: Arc<Loose>, _: Arc<Login>| async { Ok(()) },
            )]
        }
    }

    #[tokio::test]
    async fn test_loose_predicate_surfaces_binding_error() {
        let refs = Arc::new(Loose).handlers();
        let plain: EventRef = Arc::new(Event::new());

        assert!(refs[0].try_accepts(plain.as_ref()).unwrap());
        let err = refs[0].invoke(plain).await.unwrap_err();
        assert!(err.is_binding());
        assert!(refs[0].invoke(login("bob")).await.is_ok());
    }

    struct Faulty;

    impl Listener for Faulty {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![
                HandlerReference::from_parts(
                    &self,
                    "bad_predicate",
                    |_: &dyn Handleable| panic!("predicate exploded"),
                    |_: Arc<Faulty>, _: Arc<Event>| async { Ok(()) },
                ),
                HandlerReference::on_async(
                    &self,
                    "panics",
                    |_: Arc<Faulty>, ev: Arc<Event>| async move {
                        if ev.is_root() {
                            panic!("handler exploded");
                        }
                        Ok(())
                    },
                ),
            ]
        }
    }

    #[tokio::test]
    async fn test_panics_are_contained() {
        let refs = Arc::new(Faulty).handlers();

        let err = refs[0].try_accepts(&Event::new()).unwrap_err();
        assert_eq!(err.as_label(), "handler_malformed");
        assert!(err.to_string().contains("predicate exploded"));

        let err = refs[1].invoke(Arc::new(Event::new())).await.unwrap_err();
        assert_eq!(err.as_label(), "handler_panicked");
        assert!(err.to_string().contains("handler exploded"));
    }

    struct Canceller;

    impl Listener for Canceller {
        fn handlers(self: Arc<Self>) -> Vec<HandlerReference> {
            vec![HandlerReference::on_cancellable(
                &self,
                "cancel",
                |_: &Canceller, _, flag| {
                    flag.cancel();
                    Ok(())
                },
            )]
        }
    }

    #[tokio::test]
    async fn test_cancellable_site_sees_flag() {
        let refs = Arc::new(Canceller).handlers();
        let ev: EventRef = Arc::new(CancellableEvent::new());

        assert!(refs[0].try_accepts(ev.as_ref()).unwrap());
        assert!(!refs[0].try_accepts(&Event::new()).unwrap());

        refs[0].invoke(Arc::clone(&ev)).await.unwrap();
        assert!(ev.as_cancellable().is_some_and(|c| c.is_cancelled()));
    }
}
