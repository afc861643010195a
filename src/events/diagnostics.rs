//! # Cause-chain diagnostics.
//!
//! Pure helpers over the event data model; nothing here touches the dispatcher.
//!
//! ## Output of [`print_cause_chain`]
//! ```text
//! event: app::Reply id=7f0c… cause=2b91… Reply { .. }
//! cause chain (oldest first):
//!   #0 app::Request id=2b91… cause=- Request { .. }
//!   #1 app::Reply id=7f0c… cause=2b91… Reply { .. }
//! ```

use std::collections::HashSet;
use std::io;

use super::event::Handleable;

/// Formats one event as a single human-readable line.
pub fn describe(event: &dyn Handleable) -> String {
    let cause = event
        .cause()
        .map(|c| c.id().to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{} id={} cause={} {:?}", event.kind(), event.id(), cause, event)
}

/// Returns the event's causal chain, oldest first, ending with `event` itself.
///
/// Stops at the first id seen twice, so a cyclic chain is truncated instead of
/// walked forever.
pub fn cause_chain(event: &dyn Handleable) -> Vec<&dyn Handleable> {
    walk(event).0
}

/// Returns the oldest event reachable through `cause` links.
pub fn root_cause(event: &dyn Handleable) -> &dyn Handleable {
    cause_chain(event).first().copied().unwrap_or(event)
}

/// Writes `event` followed by its causal chain, oldest first.
pub fn print_cause_chain<W: io::Write>(event: &dyn Handleable, out: &mut W) -> io::Result<()> {
    writeln!(out, "event: {}", describe(event))?;

    let (chain, cyclic) = walk(event);
    writeln!(out, "cause chain (oldest first):")?;
    if cyclic {
        writeln!(out, "  (cycle)")?;
    }
    for (i, ev) in chain.iter().enumerate() {
        writeln!(out, "  #{i} {}", describe(*ev))?;
    }
    Ok(())
}

/// Collects `event` and its causes newest-first, then reverses.
fn walk(event: &dyn Handleable) -> (Vec<&dyn Handleable>, bool) {
    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    let mut cyclic = false;

    let mut cur = Some(event);
    while let Some(ev) = cur {
        if !seen.insert(ev.id()) {
            tracing::warn!(
                event = %event.id(),
                repeated = %ev.id(),
                "cyclic cause chain truncated"
            );
            cyclic = true;
            break;
        }
        chain.push(ev);
        cur = ev.cause().map(|c| &**c);
    }

    chain.reverse();
    (chain, cyclic)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use super::*;
    use crate::events::{Event, EventRef};

    #[test]
    fn test_cause_chain_is_oldest_first() {
        let e1: EventRef = Arc::new(Event::new());
        let e2 = Event::caused_by(Arc::clone(&e1));

        let chain = cause_chain(&e2);
        let ids: Vec<_> = chain.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![e1.id(), e2.id()]);
        assert_eq!(root_cause(&e2).id(), e1.id());
    }

    #[test]
    fn test_root_event_is_its_own_root() {
        let e = Event::new();
        assert_eq!(cause_chain(&e).len(), 1);
        assert_eq!(root_cause(&e).id(), e.id());
    }

    #[test]
    fn test_print_lists_cause_before_effect() {
        let e1: EventRef = Arc::new(Event::new());
        let e2 = Event::caused_by(Arc::clone(&e1));

        let mut out = Vec::new();
        print_cause_chain(&e2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let header = text.lines().next().unwrap();
        assert!(header.starts_with("event:"));
        assert!(header.contains(&e2.id().to_string()));

        let body = text.split_once("cause chain").unwrap().1;
        let pos1 = body.find(&format!("id={}", e1.id())).unwrap();
        let pos2 = body.find(&format!("id={}", e2.id())).unwrap();
        assert!(pos1 < pos2);
    }

    /// Event whose cause can be patched in after construction.
    #[derive(Debug)]
    struct Looping {
        event: Event,
        cause: OnceLock<EventRef>,
    }

    impl Handleable for Looping {
        fn event(&self) -> &Event {
            &self.event
        }

        fn cause(&self) -> Option<&EventRef> {
            self.cause.get()
        }
    }

    #[test]
    fn test_cyclic_chain_is_truncated() {
        let a = Arc::new(Looping {
            event: Event::new(),
            cause: OnceLock::new(),
        });
        let b: EventRef = Arc::new(Event::caused_by(a.clone()));
        a.cause.set(Arc::clone(&b)).unwrap();

        let chain = cause_chain(b.as_ref());
        assert_eq!(chain.len(), 2);

        let mut out = Vec::new();
        print_cause_chain(b.as_ref(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("(cycle)"));
    }
}
