use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::ActiveState;

type Comparator = dyn Fn(&ActiveState, &ActiveState) -> Ordering + Send + Sync;

/// Ordering applied to a snapshot after it has been copied out of the registry.
#[derive(Clone, Default)]
pub enum Order {
    /// Lexicographic by id, ascending.
    #[default]
    ById,
    /// Longest-active first. Entries that entered at the same instant fall
    /// back to id order.
    ByDurationDescending,
    /// Caller-supplied comparator.
    Custom(Arc<Comparator>),
}

impl Order {
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&ActiveState, &ActiveState) -> Ordering + Send + Sync + 'static,
    {
        Order::Custom(Arc::new(compare))
    }

    pub fn compare(&self, a: &ActiveState, b: &ActiveState) -> Ordering {
        match self {
            Order::ById => a.id.cmp(&b.id),
            Order::ByDurationDescending => a
                .entered_at
                .cmp(&b.entered_at)
                .then_with(|| a.id.cmp(&b.id)),
            Order::Custom(compare) => compare(a, b),
        }
    }

    /// Parses `id` or `duration` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" | "by-id" => Some(Order::ById),
            "duration" | "by-duration" => Some(Order::ByDurationDescending),
            _ => None,
        }
    }

    pub(crate) fn sort(&self, entries: &mut [ActiveState]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::ById => f.write_str("ById"),
            Order::ByDurationDescending => f.write_str("ByDurationDescending"),
            Order::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
