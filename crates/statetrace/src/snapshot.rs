//! Detached, ordered copies of the registry and their text/JSON forms.

use std::error::Error;
use std::fmt::{self, Write as _};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use facet::Facet;

use crate::ActiveState;

/// Point-in-time copy of every active state, already ordered.
///
/// Not a live view: mutating the registry afterwards leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Vec<ActiveState>,
}

impl Snapshot {
    pub(crate) fn new(entries: Vec<ActiveState>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ActiveState] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActiveState> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<ActiveState> {
        self.entries
    }

    /// Renders against the current time.
    pub fn render(&self) -> String {
        self.render_at(Instant::now())
    }

    /// Renders one block per entry:
    ///
    /// ```text
    /// /job/42: 1.503s
    ///   running
    /// ```
    ///
    /// Durations are measured against `now`, so a snapshot rendered late
    /// shows larger durations than when it was taken.
    pub fn render_at(&self, now: Instant) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{}: {:?}", entry.id, entry.elapsed_at(now));
            out.push_str("  ");
            for ch in entry.props.render().chars() {
                out.push(ch);
                if ch == '\n' {
                    out.push_str("  ");
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn to_export(&self, now: Instant) -> SnapshotExport {
        SnapshotExport {
            taken_at_unix_ms: unix_ms(SystemTime::now()),
            entries: self
                .entries
                .iter()
                .map(|entry| EntryExport {
                    id: entry.id.clone(),
                    entered_at_unix_ms: unix_ms(entry.entered_at_wall),
                    elapsed_ns: entry.elapsed_at(now).as_nanos().min(u64::MAX as u128) as u64,
                    props: entry.props.render(),
                })
                .collect(),
        }
    }

    /// Pretty JSON dump, for diagnostic endpoints.
    pub fn to_json(&self) -> Result<String, ExportError> {
        facet_json::to_string_pretty(&self.to_export(Instant::now()))
            .map_err(|e| ExportError::Serialize(e.to_string()))
    }
}

fn unix_ms(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl IntoIterator for Snapshot {
    type Item = ActiveState;
    type IntoIter = std::vec::IntoIter<ActiveState>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a ActiveState;
    type IntoIter = std::slice::Iter<'a, ActiveState>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serializable form of a [`Snapshot`].
#[derive(Facet, Debug)]
pub struct SnapshotExport {
    /// Wall-clock time the export was produced (ms since the Unix epoch).
    pub taken_at_unix_ms: u64,
    /// Entries in snapshot order.
    pub entries: Vec<EntryExport>,
}

#[derive(Facet, Debug)]
pub struct EntryExport {
    pub id: String,
    pub entered_at_unix_ms: u64,
    pub elapsed_ns: u64,
    /// Rendered props.
    pub props: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Serialize(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(message) => write!(f, "failed to serialize snapshot: {message}"),
        }
    }
}

impl Error for ExportError {}
