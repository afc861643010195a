//! # Listeners and handler references.
//!
//! This module provides the [`Listener`] trait, the [`HandlerReference`] units the
//! dispatcher stores, and the [`HandlerPriority`] tiers that order them.
//!
//! ## Architecture
//! ```text
//! register(listener)
//!     │
//!     └──► Listener::handlers(Arc<Self>) ──► [HandlerReference, ...]
//!                                               │  (listener, site, priority,
//!                                               │   accepts, invoke)
//!                                               ▼
//!                           live list, stable-sorted by HandlerPriority
//!                                               │
//! dispatch(event) ── snapshot ──► for each: try_accepts? ──► invoke(event)
//! ```
//!
//! ## Built-in listeners
//! - [`LogWriter`]: logs every event (feature `logging`).

mod listener;
#[cfg(feature = "logging")]
mod log;
mod priority;
mod reference;

pub use listener::{Listener, ListenerFn};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use priority::{HandlerPriority, ParsePriorityError};
pub use reference::HandlerReference;
