use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{ActiveState, Order, Props, Snapshot, StateGuard};

/// Thread-safe map of currently-active states, keyed by id.
///
/// A single lock guards the map. It is held for one insert, one removal, one
/// reset, or one bulk copy; sorting and rendering happen on the detached copy.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<HashMap<String, ActiveState>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` was entered now.
    ///
    /// Entering an id that is already active replaces its props and resets
    /// its entry time.
    pub fn enter(&self, id: impl Into<String>, props: impl Into<Props>) {
        let id = id.into();
        let props = props.into();
        tracing::trace!(%id, "state entered");
        let mut entries = self.entries.lock();
        // Clock read under the lock: the last writer of an id holds the latest time.
        let state = ActiveState::new(id.clone(), props);
        entries.insert(id, state);
    }

    /// Removes `id`. Leaving an id that is not active does nothing.
    pub fn leave(&self, id: &str) {
        let removed = self.entries.lock().remove(id);
        tracing::trace!(id, was_active = removed.is_some(), "state left");
    }

    /// Drops every active state.
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut *self.entries.lock());
        tracing::debug!(dropped = dropped.len(), "registry cleared");
    }

    /// Copies every active state, then sorts the copy with `order`.
    pub fn list(&self, order: &Order) -> Snapshot {
        let mut entries: Vec<ActiveState> = self.entries.lock().values().cloned().collect();
        order.sort(&mut entries);
        tracing::debug!(entries = entries.len(), ?order, "registry listed");
        Snapshot::new(entries)
    }

    /// Enters `id` and returns a guard that leaves it when dropped.
    pub fn enter_scoped(&self, id: impl Into<String>, props: impl Into<Props>) -> StateGuard<'_> {
        let id = id.into();
        self.enter(id.clone(), props);
        StateGuard::new(self, id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn enter_replaces_existing_id() {
        let registry = Registry::new();
        registry.enter("/job/1", "first");
        let first_at = registry.list(&Order::ById).entries()[0].entered_at;

        thread::sleep(Duration::from_millis(2));
        registry.enter("/job/1", "second");

        let snapshot = registry.list(&Order::ById);
        assert_eq!(snapshot.len(), 1);
        let entry = &snapshot.entries()[0];
        assert_eq!(entry.id, "/job/1");
        assert_eq!(entry.props.render(), "second");
        assert!(entry.entered_at > first_at);
    }

    #[test]
    fn leave_is_idempotent() {
        let registry = Registry::new();
        registry.enter("/keep", ());
        registry.enter("/drop", ());

        registry.leave("/drop");
        registry.leave("/drop");
        registry.leave("/never-entered");

        assert_eq!(ids(&registry.list(&Order::ById)), ["/keep"]);
    }

    #[test]
    fn clear_empties_registry() {
        let registry = Registry::new();
        for i in 0..50 {
            registry.enter(format!("/item/{i}"), ());
        }
        assert_eq!(registry.len(), 50);

        registry.clear();
        assert!(registry.list(&Order::default()).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn list_of_empty_registry_is_empty() {
        assert!(Registry::new().list(&Order::ByDurationDescending).is_empty());
    }

    #[test]
    fn list_by_id() {
        let registry = Registry::new();
        registry.enter("b", ());
        registry.enter("a", ());
        registry.enter("c", ());
        assert_eq!(ids(&registry.list(&Order::ById)), ["a", "b", "c"]);
    }

    #[test]
    fn list_by_duration_puts_older_first() {
        let registry = Registry::new();
        registry.enter("y-but-older", ());
        thread::sleep(Duration::from_millis(2));
        registry.enter("x-but-newer", ());
        assert_eq!(
            ids(&registry.list(&Order::ByDurationDescending)),
            ["y-but-older", "x-but-newer"]
        );
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = Registry::new();
        registry.enter("/a", "one");
        registry.enter("/b", "two");
        let snapshot = registry.list(&Order::ById);

        registry.enter("/c", ());
        registry.enter("/a", "changed");
        registry.leave("/b");
        registry.clear();

        assert_eq!(ids(&snapshot), ["/a", "/b"]);
        assert_eq!(snapshot.entries()[0].props.render(), "one");
    }

    #[test]
    fn contains_tracks_presence() {
        let registry = Registry::new();
        assert!(!registry.contains("/x"));
        registry.enter("/x", ());
        assert!(registry.contains("/x"));
        registry.leave("/x");
        assert!(!registry.contains("/x"));
    }
}
