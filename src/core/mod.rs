//! Event manager core: queue, dispatch loop, and the two managers.
//!
//! The public API from this module is the [`EventManager`] contract, its two
//! implementations, and their configuration.
//!
//! Internal modules:
//! - [`queue`]: unbounded MPSC queue with a pending counter;
//! - [`dispatcher`]: copy-on-write handler list and the per-event delivery loop;
//! - [`event_thread`]: manager with a background dispatch worker;
//! - [`sync_manager`]: manager pumped by its owner;
//! - [`builder`]: constructs an [`EventThread`] with initial listeners.

mod builder;
mod config;
mod dispatcher;
mod event_thread;
mod manager;
mod queue;
mod sync_manager;

pub use builder::EventThreadBuilder;
pub use config::{Config, Reregistration};
pub use dispatcher::DispatchReport;
pub use event_thread::EventThread;
pub use manager::EventManager;
pub use sync_manager::SyncEventManager;
