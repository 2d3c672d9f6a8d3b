//! In-process state tracing.
//!
//! When some state in the program is entered, record it with [`enter`]; when
//! it is left, remove it with [`leave`]. At any time [`list`] returns a
//! snapshot of everything still active, with how long each state has been
//! active and the props attached on entry. This tells you which functions or
//! higher-level operations are stuck, slow, or leaked.
//!
//! Ids are opaque keys, conventionally path-like: `/funcname` for function
//! entry/exit, `/itemtype/id1`, `/itemtype/id2` for members of a set. The
//! registry enforces no hierarchy.
//!
//! ```rust,no_run
//! statetrace::enter("/ingest/batch-17", "3 files pending");
//! // ...
//! print!("{}", statetrace::list(&statetrace::Order::ByDurationDescending));
//! statetrace::leave("/ingest/batch-17");
//! ```
//!
//! The free functions operate on the process-wide [`global`] registry. Code
//! that wants isolation (tests, embedded subsystems) constructs its own
//! [`Registry`] and passes it around by reference.

use std::sync::LazyLock;

mod dump;
mod entry;
mod guard;
mod order;
mod props;
mod registry;
mod snapshot;


pub use dump::{DUMP_INTERVAL_ENV, DUMP_ORDER_ENV, DumpConfig, dump_once, spawn_periodic_dump};
pub use entry::ActiveState;
pub use guard::StateGuard;
pub use order::Order;
pub use props::Props;
pub use registry::Registry;
pub use snapshot::{EntryExport, ExportError, Snapshot, SnapshotExport};

#[doc(hidden)]
pub use facet_value;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Enters `id` in the process-wide registry. See [`Registry::enter`].
pub fn enter(id: impl Into<String>, props: impl Into<Props>) {
    GLOBAL.enter(id, props);
}

/// Leaves `id` in the process-wide registry. See [`Registry::leave`].
pub fn leave(id: &str) {
    GLOBAL.leave(id);
}

/// Clears the process-wide registry.
pub fn clear() {
    GLOBAL.clear();
}

/// Snapshot of the process-wide registry. See [`Registry::list`].
pub fn list(order: &Order) -> Snapshot {
    GLOBAL.list(order)
}

/// Scoped entry in the process-wide registry. See [`Registry::enter_scoped`].
pub fn enter_scoped(id: impl Into<String>, props: impl Into<Props>) -> StateGuard<'static> {
    GLOBAL.enter_scoped(id, props)
}
