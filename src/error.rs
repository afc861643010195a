//! Error types used by the event runtime and handler invocations.
//!
//! This module defines two main error enums:
//!
//! - [`HandlerError`]: a single handler failed for a single event. Contained by the
//!   dispatch loop: logged, never returned to the producer.
//! - [`RuntimeError`]: errors raised by the dispatch worker's lifecycle.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// Error type returned by handler bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Per-handler failures.
///
/// The dispatch loop treats every variant the same way (log and move on to the
/// next handler); the variants keep the cause apart for diagnostics.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The acceptance predicate itself panicked; the handler reference is broken.
    #[error("handler '{site}' of listener '{listener}' has a broken acceptance check: {info}")]
    Malformed {
        /// Owning listener name.
        listener: String,
        /// Handler site name.
        site: &'static str,
        /// Panic payload.
        info: String,
    },

    /// The event could not be bound to the handler's declared parameter type.
    #[error("handler '{site}' of listener '{listener}' expects {expected}, got {found}")]
    Binding {
        /// Owning listener name.
        listener: String,
        /// Handler site name.
        site: &'static str,
        /// Declared parameter type.
        expected: &'static str,
        /// Runtime event type.
        found: &'static str,
    },

    /// The handler ran and returned an error.
    #[error("handler '{site}' of listener '{listener}' failed: {source}")]
    Failed {
        /// Owning listener name.
        listener: String,
        /// Handler site name.
        site: &'static str,
        /// Error returned by the handler body.
        #[source]
        source: BoxError,
    },

    /// The handler panicked.
    #[error("handler '{site}' of listener '{listener}' panicked: {info}")]
    Panicked {
        /// Owning listener name.
        listener: String,
        /// Handler site name.
        site: &'static str,
        /// Panic payload.
        info: String,
    },
}

impl HandlerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::HandlerError;
    ///
    /// let err = HandlerError::Panicked {
    ///     listener: "audit".into(),
    ///     site: "on_login",
    ///     info: "boom".into(),
    /// };
    /// assert_eq!(err.as_label(), "handler_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Malformed { .. } => "handler_malformed",
            HandlerError::Binding { .. } => "handler_binding",
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Malformed { info, .. } => format!("acceptance check panicked: {info}"),
            HandlerError::Binding {
                expected, found, ..
            } => format!("cannot bind {found} to {expected}"),
            HandlerError::Failed { source, .. } => format!("error: {source}"),
            HandlerError::Panicked { info, .. } => format!("panic: {info}"),
        }
    }

    /// Name of the listener that owns the failing handler.
    pub fn listener(&self) -> &str {
        match self {
            HandlerError::Malformed { listener, .. }
            | HandlerError::Binding { listener, .. }
            | HandlerError::Failed { listener, .. }
            | HandlerError::Panicked { listener, .. } => listener,
        }
    }

    /// Name of the failing handler site.
    pub fn site(&self) -> &'static str {
        match self {
            HandlerError::Malformed { site, .. }
            | HandlerError::Binding { site, .. }
            | HandlerError::Failed { site, .. }
            | HandlerError::Panicked { site, .. } => site,
        }
    }

    /// Indicates a wiring problem rather than a failure inside the handler body.
    ///
    /// Returns `true` for [`HandlerError::Malformed`] and [`HandlerError::Binding`].
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            HandlerError::Malformed { .. } | HandlerError::Binding { .. }
        )
    }
}

/// # Errors produced by the dispatch worker's lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The worker did not finish its in-flight event within the grace period and was aborted.
    #[error("dispatch worker '{name}' did not stop within {grace:?}; aborted")]
    GraceExceeded {
        /// Worker name from [`Config::name`](crate::Config::name).
        name: String,
        /// The configured grace duration.
        grace: Duration,
    },

    /// The worker task terminated abnormally.
    #[error("dispatch worker '{name}' terminated abnormally: {info}")]
    WorkerPanicked {
        /// Worker name from [`Config::name`](crate::Config::name).
        name: String,
        /// Join error details.
        info: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded {
    ///     name: "events".into(),
    ///     grace: Duration::from_secs(5),
    /// };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { name, grace } => {
                format!("worker {name} still busy after {grace:?}")
            }
            RuntimeError::WorkerPanicked { name, info } => {
                format!("worker {name} died: {info}")
            }
        }
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_keeps_source() {
        let err = HandlerError::Failed {
            listener: "audit".into(),
            site: "on_login",
            source: "disk full".into(),
        };
        assert_eq!(err.as_label(), "handler_failed");
        assert_eq!(err.listener(), "audit");
        assert_eq!(err.site(), "on_login");
        assert!(!err.is_binding());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_binding_is_wiring_problem() {
        let err = HandlerError::Binding {
            listener: "audit".into(),
            site: "on_login",
            expected: "Login",
            found: "Event",
        };
        assert!(err.is_binding());
        assert_eq!(err.as_message(), "cannot bind Event to Login");
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(&*s), "static");
        assert_eq!(panic_message(&*owned), "owned");
        assert_eq!(panic_message(&*other), "unknown panic");
    }
}
