//! # Event manager configuration.
//!
//! Provides [`Config`], the settings shared by [`EventThread`](crate::EventThread)
//! and [`SyncEventManager`](crate::SyncEventManager).
//!
//! ## Sentinel values
//! - `grace = 0s` → `shutdown()` aborts the worker without waiting for the in-flight event

use std::borrow::Cow;
use std::time::Duration;

/// What `register` does when the listener already has handlers in the live list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reregistration {
    /// Append the listener's handlers again; each site then runs once per registration.
    #[default]
    Append,
    /// Drop the listener's existing handlers first, so registering twice equals registering once.
    Replace,
}

/// Configuration for an event manager.
///
/// ## Field semantics
/// - `name`: label attached to every log line of this manager
/// - `reregistration`: duplicate-registration behavior (see [`Reregistration`])
/// - `grace`: maximum wait for the worker to finish its in-flight event on shutdown
///
/// ## Notes
/// All fields are public for flexibility, like the rest of the runtime settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// Manager label for logs and errors.
    pub name: Cow<'static, str>,

    /// Behavior of `register` for an already-registered listener.
    pub reregistration: Reregistration,

    /// Maximum time `EventThread::shutdown` waits before aborting the worker.
    ///
    /// - The worker always finishes the event it is dispatching before it stops;
    ///   `grace` bounds how long that may take.
    /// - If exceeded, the worker is aborted and `RuntimeError::GraceExceeded` is returned.
    pub grace: Duration,
}

impl Config {
    /// Creates the default configuration under a different name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the shutdown grace period as an `Option`.
    ///
    /// - `None` → abort immediately
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "events"`
    /// - `reregistration = Reregistration::Append`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("events"),
            reregistration: Reregistration::default(),
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.name, "events");
        assert_eq!(cfg.reregistration, Reregistration::Append);
        assert_eq!(cfg.grace_period(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_grace_means_abort() {
        let cfg = Config {
            grace: Duration::ZERO,
            ..Config::named("ui")
        };
        assert_eq!(cfg.name, "ui");
        assert_eq!(cfg.grace_period(), None);
    }
}
