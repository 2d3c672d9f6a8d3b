use std::time::{Duration, Instant, SystemTime};

use crate::Props;

/// One currently-active tracked state.
#[derive(Debug, Clone)]
pub struct ActiveState {
    /// Identifier for the state entered, conventionally path-like
    /// (`/funcname`, `/itemtype/id1`). Treated as an opaque key.
    pub id: String,
    /// Caller-supplied diagnostic data.
    pub props: Props,
    /// When the state was entered.
    pub entered_at: Instant,
    /// Wall-clock time of entry, only used for exported snapshots.
    pub entered_at_wall: SystemTime,
}

impl ActiveState {
    pub(crate) fn new(id: String, props: Props) -> Self {
        Self {
            id,
            props,
            entered_at: Instant::now(),
            entered_at_wall: SystemTime::now(),
        }
    }

    /// Time spent in this state as of `now`. Zero if `now` predates entry.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.entered_at)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }
}
